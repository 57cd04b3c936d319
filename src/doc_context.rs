use crate::types::Rect;

#[derive(Debug, Clone, Copy)]
pub struct DocContext {
    pub header_rect: Rect,
}

impl DocContext {
    pub fn new(header_rect: Rect) -> Self {
        Self { header_rect }
    }
}
