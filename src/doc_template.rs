use crate::canvas::{Canvas, Document};
use crate::debug::DebugLogger;
use crate::error::RenderError;
use crate::flowable::{BreakBefore, Flowable};
use crate::frame::{AddResult, Frame};
use crate::metrics::{DocumentMetrics, PageMetrics};
use crate::page_template::PageTemplate;
use serde_json::json;
use std::collections::VecDeque;
use std::time::Instant;

pub struct DocTemplate {
    template: PageTemplate,
    story: Vec<Box<dyn Flowable>>,
    max_pages: usize,
    debug: Option<DebugLogger>,
}

struct PageState {
    canvas: Canvas,
    page_number: usize,
    frame: Frame,
    placed_on_page: bool,
    page_flowables: usize,
    page_start: Instant,
    metrics: DocumentMetrics,
}

impl DocTemplate {
    pub fn new(template: PageTemplate, max_pages: usize) -> Self {
        Self {
            template,
            story: Vec::new(),
            max_pages: max_pages.max(1),
            debug: None,
        }
    }

    pub(crate) fn with_debug(mut self, debug: Option<DebugLogger>) -> Self {
        self.debug = debug;
        self
    }

    pub fn add_flowable(&mut self, flowable: Box<dyn Flowable>) {
        self.story.push(flowable);
    }

    fn log_page_break(&self, from_page: usize, reason: &str, flowable: &str) {
        let Some(logger) = self.debug.as_ref() else {
            return;
        };
        logger.log_event(
            "page_break",
            json!({
                "reason": reason,
                "from_page": from_page,
                "to_page": from_page + 1,
                "flowable": flowable,
            }),
        );
        logger.increment("page_break", 1);
    }

    fn open_page(&self, state: &mut PageState) {
        state.frame = self.template.instantiate_frame();
        state.placed_on_page = false;
        if let Some(callback) = self.template.on_page() {
            callback(&mut state.canvas, &self.template.context());
        }
        state
            .canvas
            .meta(crate::META_PAGE_TEMPLATE_KEY, self.template.name.clone());
    }

    fn finish_page(&self, state: &mut PageState) {
        let elapsed = state.page_start.elapsed().as_secs_f64() * 1000.0;
        state.metrics.total_layout_ms += elapsed;
        state.metrics.pages.push(PageMetrics {
            page_number: state.page_number,
            layout_ms: elapsed,
            command_count: state.canvas.current_command_count(),
            flowable_count: state.page_flowables,
        });
        state.canvas.show_page();
        state.page_flowables = 0;
        state.page_start = Instant::now();
    }

    fn next_page(&self, state: &mut PageState, reason: &str, flowable: &str) -> Result<(), RenderError> {
        if state.page_number >= self.max_pages {
            return Err(RenderError::TooManyPages {
                pages: state.page_number + 1,
                limit: self.max_pages,
            });
        }
        self.log_page_break(state.page_number, reason, flowable);
        self.finish_page(state);
        state.metrics.page_breaks += 1;
        state.page_number += 1;
        self.open_page(state);
        Ok(())
    }

    pub fn build_with_metrics(mut self) -> Result<(Document, DocumentMetrics), RenderError> {
        let story: VecDeque<Box<dyn Flowable>> = std::mem::take(&mut self.story).into();
        let mut state = PageState {
            canvas: Canvas::new(self.template.page_size),
            page_number: 1,
            frame: self.template.instantiate_frame(),
            placed_on_page: false,
            page_flowables: 0,
            page_start: Instant::now(),
            metrics: DocumentMetrics::default(),
        };
        self.open_page(&mut state);

        let mut story = story;
        while let Some(flowable) = story.pop_front() {
            let mut current = flowable;
            let mut continuation = false;
            loop {
                let name = current.debug_name();
                let pagination = current.pagination();
                if !continuation
                    && matches!(pagination.break_before, BreakBefore::Page)
                    && state.placed_on_page
                {
                    self.next_page(&mut state, "break_before_page", name)?;
                }

                match state.frame.add(current, &mut state.canvas) {
                    AddResult::Placed => {
                        state.placed_on_page = true;
                        state.page_flowables += 1;
                        break;
                    }
                    AddResult::Split(remaining) => {
                        state.placed_on_page = true;
                        state.page_flowables += 1;
                        self.next_page(&mut state, "flowable_split", name)?;
                        continuation = true;
                        current = remaining;
                    }
                    AddResult::Overflow(remaining) => {
                        if !state.placed_on_page {
                            let frame = state.frame.rect();
                            let size = remaining.wrap(frame.width, frame.height);
                            return Err(RenderError::UnplaceableContent(format!(
                                "{} needs {}pt but a page holds {}pt",
                                name,
                                size.height.to_f32(),
                                frame.height.to_f32()
                            )));
                        }
                        self.next_page(&mut state, "frame_overflow", name)?;
                        current = remaining;
                    }
                }
            }
        }

        self.finish_page(&mut state);
        let document = state.canvas.finish_without_show();
        state.metrics.table_rows = document
            .pages
            .iter()
            .map(|page| page.meta_values(crate::META_TABLE_ROW_KEY).count())
            .sum();
        Ok((document, state.metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowable::{Paragraph, SectionHeading};
    use crate::types::{Margins, Pt, Size};

    fn template() -> PageTemplate {
        PageTemplate::new(
            "test",
            Size {
                width: Pt::from_f32(283.0),
                height: Pt::from_f32(227.0),
            },
            Margins::all(10.0),
            Pt::from_f32(12.0),
            Pt::from_f32(8.0),
        )
        .set_on_page(|canvas, ctx| {
            canvas.draw_string(ctx.header_rect.x, ctx.header_rect.y, "running header");
        })
    }

    #[test]
    fn section_headings_start_new_pages_and_decorate_each() {
        let mut doc = DocTemplate::new(template(), 10);
        doc.add_flowable(Box::new(SectionHeading::new("a", "First")));
        doc.add_flowable(Box::new(Paragraph::new("body")));
        doc.add_flowable(Box::new(SectionHeading::new("b", "Second")));
        let (document, metrics) = doc.build_with_metrics().expect("layout succeeds");
        assert_eq!(document.page_count(), 2);
        assert_eq!(metrics.pages.len(), 2);
        assert_eq!(metrics.page_breaks, 1);
        for page in &document.pages {
            assert!(page.contains_text("running header"));
        }
        assert!(document.pages[1].contains_text("Second"));
    }

    #[test]
    fn page_cap_fails_the_build() {
        let mut doc = DocTemplate::new(template(), 2);
        for key in ["a", "b", "c"] {
            doc.add_flowable(Box::new(SectionHeading::new(key, key)));
        }
        match doc.build_with_metrics().map(|(document, _)| document) {
            Err(RenderError::TooManyPages { pages, limit }) => {
                assert_eq!((pages, limit), (3, 2));
            }
            other => panic!("expected TooManyPages, got {:?}", other.map(|d| d.page_count())),
        }
    }

    #[test]
    fn content_taller_than_a_page_is_rejected() {
        struct Tall;
        impl Flowable for Tall {
            fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
                Size {
                    width: avail_width,
                    height: Pt::from_f32(5000.0),
                }
            }
            fn split(&self, _: Pt, _: Pt) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
                None
            }
            fn draw(&self, _: &mut Canvas, _: Pt, _: Pt, _: Pt, _: Pt) {}
        }
        let mut doc = DocTemplate::new(template(), 10);
        doc.add_flowable(Box::new(Tall));
        let err = doc.build_with_metrics().map(|_| ()).expect_err("tall content cannot be placed");
        assert!(matches!(err, RenderError::UnplaceableContent(_)));
    }
}
