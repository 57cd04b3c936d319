use crate::canvas::Canvas;
use crate::flowable::{BreakInside, Flowable};
use crate::types::{Pt, Rect};

pub enum AddResult {
    Placed,
    Split(Box<dyn Flowable>),
    Overflow(Box<dyn Flowable>),
}

pub struct Frame {
    rect: Rect,
    cursor_y: Pt,
}

impl Frame {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect: rect.quantized(),
            cursor_y: Pt::ZERO,
        }
    }

    pub fn remaining_height(&self) -> Pt {
        (self.rect.height - self.cursor_y).max(Pt::ZERO)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_empty(&self) -> bool {
        self.cursor_y <= Pt::ZERO
    }

    fn place(&mut self, flowable: &dyn Flowable, canvas: &mut Canvas, height: Pt) {
        let rect = Rect::new(self.rect.x, self.rect.y + self.cursor_y, self.rect.width, height);
        flowable.draw(
            canvas,
            rect.x,
            rect.y,
            self.rect.width,
            self.remaining_height(),
        );
        canvas.record_flowable_bounds(flowable.debug_name(), rect);
        self.cursor_y += height;
    }

    // Places as much of `flowable` as fits. Content is never drawn past the
    // frame bottom: anything that does not fit comes back as `Split` or
    // `Overflow` for the next page.
    pub fn add(&mut self, flowable: Box<dyn Flowable>, canvas: &mut Canvas) -> AddResult {
        let avail_width = self.rect.width;
        let avail_height = self.remaining_height();
        if avail_height <= Pt::ZERO {
            return AddResult::Overflow(flowable);
        }

        let size = flowable.wrap(avail_width, avail_height);
        if size.height <= avail_height {
            self.place(flowable.as_ref(), canvas, size.height);
            return AddResult::Placed;
        }

        // Keep-together content moves to a fresh page when it would fit there.
        if matches!(flowable.pagination().break_inside, BreakInside::Avoid)
            && size.height <= self.rect.height
            && !self.is_empty()
        {
            return AddResult::Overflow(flowable);
        }

        if let Some((first, second)) = flowable.split(avail_width, avail_height) {
            let first_size = first.wrap(avail_width, avail_height);
            if first_size.height > Pt::ZERO && first_size.height <= avail_height {
                self.place(first.as_ref(), canvas, first_size.height);
                return AddResult::Split(second);
            }
        }

        AddResult::Overflow(flowable)
    }

    // Walks `flowable` through empty copies of this frame, splitting the way
    // `add` does, and returns the height of the first part that no empty
    // frame can hold. Stops looking after `max_parts` pages.
    pub fn oversized_part(&self, flowable: &dyn Flowable, max_parts: usize) -> Option<Pt> {
        let width = self.rect.width;
        let height = self.rect.height;
        let mut rest: Option<Box<dyn Flowable>> = None;
        for _ in 0..max_parts {
            let current: &dyn Flowable = match rest.as_deref() {
                Some(part) => part,
                None => flowable,
            };
            let size = current.wrap(width, height);
            if size.height <= height {
                return None;
            }
            let Some((first, second)) = current.split(width, height) else {
                return Some(size.height);
            };
            let first_height = first.wrap(width, height).height;
            if first_height <= Pt::ZERO || first_height > height {
                return Some(size.height);
            }
            rest = Some(second);
        }
        None
    }
}
