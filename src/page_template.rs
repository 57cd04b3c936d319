use crate::canvas::Canvas;
use crate::doc_context::DocContext;
use crate::frame::Frame;
use crate::types::{Margins, Pt, Rect, Size};
use std::sync::Arc;

pub type OnPageCallback = Arc<dyn Fn(&mut Canvas, &DocContext) + Send + Sync>;

#[derive(Clone)]
pub struct PageTemplate {
    pub name: String,
    pub page_size: Size,
    header_rect: Rect,
    footer_rect: Rect,
    frame_rect: Rect,
    on_page: Option<OnPageCallback>,
}

const BAND_GAP: f32 = 8.0;

impl PageTemplate {
    pub fn new(
        name: impl Into<String>,
        page_size: Size,
        margins: Margins,
        header_height: Pt,
        footer_height: Pt,
    ) -> Self {
        let page_size = page_size.quantized();
        let margins = margins.quantized();
        let gap = Pt::from_f32(BAND_GAP);
        let inner_width = page_size.width - margins.left - margins.right;
        let header_rect = Rect::new(margins.left, margins.top, inner_width, header_height);
        let footer_top = page_size.height - margins.bottom - footer_height;
        let footer_rect = Rect::new(margins.left, footer_top, inner_width, footer_height);
        let frame_top = header_rect.bottom() + gap;
        let frame_height = (footer_top - gap - frame_top).max(Pt::ZERO);
        Self {
            name: name.into(),
            page_size,
            header_rect,
            footer_rect,
            frame_rect: Rect::new(margins.left, frame_top, inner_width, frame_height).quantized(),
            on_page: None,
        }
    }

    pub fn set_on_page<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Canvas, &DocContext) + Send + Sync + 'static,
    {
        self.on_page = Some(Arc::new(callback));
        self
    }

    pub fn on_page(&self) -> Option<&OnPageCallback> {
        self.on_page.as_ref()
    }

    pub fn frame_rect(&self) -> Rect {
        self.frame_rect
    }

    pub fn footer_rect(&self) -> Rect {
        self.footer_rect
    }

    pub fn instantiate_frame(&self) -> Frame {
        Frame::new(self.frame_rect)
    }

    pub fn context(&self) -> DocContext {
        DocContext::new(self.header_rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_sits_between_header_and_footer() {
        let template = PageTemplate::new(
            "swms",
            Size::a4_landscape(),
            Margins::all(24.0),
            Pt::from_f32(50.0),
            Pt::from_f32(20.0),
        );
        let frame = template.frame_rect();
        let header = template.context().header_rect;
        assert!(frame.y >= header.bottom());
        assert!(frame.bottom() <= template.footer_rect().y);
        assert_eq!(frame.width, header.width);
        assert!(frame.height > Pt::from_f32(400.0));
    }
}
