use serde::Serialize;

pub const DEFAULT_RADIUS: u32 = 2;
pub const DEFAULT_JUMP_STRIDE: u32 = 100;
/// Largest offset the catalog accepts on listing endpoints.
pub const MAX_OFFSET: u64 = 10_000;

/// The page-number controls for one listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub current: u32,
    pub total_pages: u32,
    pub pages: Vec<u32>,
    pub jump: Option<u32>,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageWindow {
    pub fn new(current: u32, total_pages: u32) -> Self {
        Self::with(current, total_pages, DEFAULT_RADIUS, DEFAULT_JUMP_STRIDE)
    }

    pub fn with(current: u32, total_pages: u32, radius: u32, stride: u32) -> Self {
        Self {
            current,
            total_pages,
            pages: visible_pages(current, total_pages, radius),
            jump: jump_target_with_radius(current, total_pages, radius, stride),
            has_previous: current > 1 && total_pages > 0,
            has_next: current < total_pages,
        }
    }
}

pub fn visible_pages(current: u32, total_pages: u32, radius: u32) -> Vec<u32> {
    if total_pages == 0 {
        return Vec::new();
    }
    let start = current.saturating_sub(radius).max(1);
    let end = current.saturating_add(radius).min(total_pages);
    (start..=end).collect()
}

/// Next multiple of `stride` at or after `current + stride`, clipped to the
/// last page, when it lies beyond the default visible window.
pub fn jump_target(current: u32, total_pages: u32, stride: u32) -> Option<u32> {
    jump_target_with_radius(current, total_pages, DEFAULT_RADIUS, stride)
}

fn jump_target_with_radius(current: u32, total_pages: u32, radius: u32, stride: u32) -> Option<u32> {
    if stride == 0 {
        return None;
    }
    let last_visible = *visible_pages(current, total_pages, radius).last()?;

    let stride = u64::from(stride);
    let reach = u64::from(current) + stride;
    let candidate = reach.div_ceil(stride) * stride;
    let candidate = candidate.min(u64::from(total_pages));

    if candidate <= u64::from(last_visible) || candidate > u64::from(total_pages) {
        return None;
    }
    u32::try_from(candidate).ok()
}

pub fn resolve_offset(page: u32, page_size: u32, max_offset: u64) -> u64 {
    let offset = u64::from(page.saturating_sub(1)) * u64::from(page_size);
    offset.min(max_offset)
}

pub fn total_pages(total_items: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_items.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
