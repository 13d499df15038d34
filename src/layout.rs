//! Flex layout for composing multi-column rows inside a region.
//!
//! Column extents are resolved against the available width in a single pass
//! plus an iterative redistribution step for max-capped flex columns. The
//! output is geometry only (`x_offset`/`width` per column); callers paint
//! their content into the region's shared line buffers with [`merge_into`],
//! which splices at a column offset instead of overwriting the line — two
//! columns writing to the same output line must both stay visible.

use crate::ansi;
use smallvec::SmallVec;

/// Sizing constraints for one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Minimum width in columns.
    pub min: Option<u16>,
    /// Maximum width in columns.
    pub max: Option<u16>,
    /// Flex weight; columns share leftover width proportionally.
    /// `None` (or zero) means the column is fixed.
    pub flex: Option<u16>,
    /// Intrinsic content width, used to size fixed columns.
    pub content: Option<u16>,
}

impl ColumnSpec {
    /// A column that is exactly `width` columns wide.
    pub fn fixed(width: u16) -> Self {
        Self {
            min: Some(width),
            max: Some(width),
            flex: None,
            content: None,
        }
    }

    /// A column sharing leftover width with the given weight.
    pub fn flex(weight: u16) -> Self {
        Self {
            min: None,
            max: None,
            flex: Some(weight),
            content: None,
        }
    }

    /// A fixed column sized to its content.
    pub fn content(width: u16) -> Self {
        Self {
            min: None,
            max: None,
            flex: None,
            content: Some(width),
        }
    }

    /// Set the minimum width.
    pub fn with_min(mut self, min: u16) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the maximum width.
    pub fn with_max(mut self, max: u16) -> Self {
        self.max = Some(max);
        self
    }

    fn is_flex(&self) -> bool {
        self.flex.is_some_and(|w| w > 0)
    }

    fn clamp(&self, width: u16) -> u16 {
        let mut w = width;
        if let Some(max) = self.max {
            w = w.min(max);
        }
        if let Some(min) = self.min {
            w = w.max(min);
        }
        w
    }

    /// Width of a fixed column: content clamped to `[min, max]`, or the
    /// minimum when no content width is given.
    fn fixed_width(&self) -> u16 {
        self.clamp(self.content.unwrap_or(self.min.unwrap_or(0)))
    }

    /// The floor this column can never go below.
    fn floor(&self) -> u16 {
        if self.is_flex() {
            self.min.unwrap_or(0)
        } else {
            self.fixed_width()
        }
    }
}

/// Resolved geometry for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnExtent {
    /// Starting column offset within the row (0-based).
    pub x_offset: u16,
    /// Width in columns.
    pub width: u16,
}

/// Type alias for resolved extent runs.
pub type Extents = SmallVec<[ColumnExtent; 8]>;

/// Resolve column widths for a row.
///
/// Fixed columns take `clamp(content, min, max)`; the remainder after gaps
/// is split across flex columns proportionally to their weights with a
/// largest-remainder rounding rule (earliest column wins ties), then clamped
/// to each column's `[min, max]`. Width freed by max-caps is redistributed
/// among the still-uncapped flex columns until stable.
///
/// When the mins alone do not fit, every column gets its floor width in
/// declaration order and later columns simply overflow `available` — a
/// deterministic degradation, not an error.
///
/// # Example
///
/// ```
/// use liveregion::layout::{resolve_row, ColumnSpec};
///
/// let specs = [ColumnSpec::fixed(12), ColumnSpec::flex(1)];
/// let extents = resolve_row(40, 2, &specs);
/// assert_eq!(extents[0].width, 12);
/// assert_eq!(extents[1].width, 26);
/// assert_eq!(extents[1].x_offset, 14);
/// ```
pub fn resolve_row(available: u16, gap: u16, specs: &[ColumnSpec]) -> Extents {
    let n = specs.len();
    if n == 0 {
        return Extents::new();
    }
    let gaps_total = gap.saturating_mul((n - 1) as u16);
    let floor_total: u32 = specs.iter().map(|s| u32::from(s.floor())).sum();

    let widths: SmallVec<[u16; 8]> = if floor_total + u32::from(gaps_total) > u32::from(available)
    {
        // Mins don't fit: honor them in declaration order and overflow
        specs.iter().map(ColumnSpec::floor).collect()
    } else {
        distribute(available, gaps_total, specs)
    };

    let mut extents = Extents::with_capacity(n);
    let mut x: u32 = 0;
    for (i, &width) in widths.iter().enumerate() {
        if i > 0 {
            x += u32::from(gap);
        }
        extents.push(ColumnExtent {
            x_offset: x as u16,
            width,
        });
        x += u32::from(width);
    }
    extents
}

/// Flex distribution with iterative redistribution of capped width.
fn distribute(available: u16, gaps_total: u16, specs: &[ColumnSpec]) -> SmallVec<[u16; 8]> {
    let mut widths: SmallVec<[u16; 8]> = specs.iter().map(ColumnSpec::fixed_width).collect();
    let mut active: SmallVec<[usize; 8]> = specs
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_flex())
        .map(|(i, _)| i)
        .collect();
    for &i in &active {
        widths[i] = 0;
    }

    let fixed_total: u32 = widths.iter().map(|&w| u32::from(w)).sum();
    let mut pool =
        u32::from(available).saturating_sub(fixed_total + u32::from(gaps_total)) as u16;

    while !active.is_empty() && pool > 0 {
        let shares = proportional_shares(pool, &active, specs);
        let mut still_active: SmallVec<[usize; 8]> = SmallVec::new();
        let mut clamped_any = false;
        for (slot, &i) in active.iter().enumerate() {
            let share = shares[slot];
            let clamped = specs[i].clamp(share);
            if clamped == share {
                still_active.push(i);
            } else {
                // Capped column leaves the pool; its width is final
                widths[i] = clamped;
                pool = pool.saturating_sub(clamped.min(pool));
                clamped_any = true;
            }
        }
        if !clamped_any {
            for (slot, &i) in active.iter().enumerate() {
                widths[i] = shares[slot];
            }
            break;
        }
        active = still_active;
    }

    // Flex columns that never received a share still honor their min
    for (i, spec) in specs.iter().enumerate() {
        if spec.is_flex() && widths[i] == 0 {
            widths[i] = widths[i].max(spec.min.unwrap_or(0));
        }
    }
    widths
}

/// Split `pool` across `active` columns proportionally to their weights.
/// Largest-remainder rounding; ties go to the earliest column, so the
/// result is deterministic and sums exactly to `pool`.
fn proportional_shares(pool: u16, active: &[usize], specs: &[ColumnSpec]) -> SmallVec<[u16; 8]> {
    let total_weight: u32 = active
        .iter()
        .map(|&i| u32::from(specs[i].flex.unwrap_or(0)))
        .sum();
    if total_weight == 0 {
        return SmallVec::from_elem(0, active.len());
    }
    let mut shares: SmallVec<[u16; 8]> = SmallVec::with_capacity(active.len());
    let mut remainders: SmallVec<[(u32, usize); 8]> = SmallVec::new();
    let mut assigned: u32 = 0;
    for (slot, &i) in active.iter().enumerate() {
        let weight = u32::from(specs[i].flex.unwrap_or(0));
        let exact = u32::from(pool) * weight;
        let base = exact / total_weight;
        shares.push(base as u16);
        assigned += base;
        remainders.push((exact % total_weight, slot));
    }
    let mut leftover = u32::from(pool) - assigned;
    // Stable sort: equal remainders keep declaration order
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, slot) in &remainders {
        if leftover == 0 {
            break;
        }
        shares[slot] += 1;
        leftover -= 1;
    }
    shares
}

/// Layout direction of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Children side by side, sharing the available width.
    #[default]
    Row,
    /// Children stacked vertically at the container width.
    Column,
}

/// An ordered group of columns and nested containers.
#[derive(Debug, Clone, Default)]
pub struct FlexContainer {
    /// Blank columns (row) or blank lines (column) between children.
    pub gap: u16,
    /// Layout direction.
    pub direction: Direction,
    /// Ordered children.
    pub children: Vec<FlexItem>,
}

/// A child of a [`FlexContainer`].
#[derive(Debug, Clone)]
pub enum FlexItem {
    /// A leaf column.
    Column(ColumnSpec),
    /// A nested container. Inside a row it sizes as a weight-1 flex column.
    Container(FlexContainer),
}

/// Resolved geometry for a container child, relative to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    /// Column offset within the parent.
    pub x_offset: u16,
    /// Line offset within the parent.
    pub y_offset: u16,
    /// Width in columns.
    pub width: u16,
    /// Height in lines (1 for a leaf column).
    pub height: u16,
    /// Resolved grandchildren for nested containers; empty for leaves.
    pub children: Vec<ResolvedItem>,
}

impl FlexContainer {
    /// Create a row container with the given gap.
    pub fn row(gap: u16) -> Self {
        Self {
            gap,
            direction: Direction::Row,
            children: Vec::new(),
        }
    }

    /// Create a column (stacking) container with the given gap.
    pub fn column(gap: u16) -> Self {
        Self {
            gap,
            direction: Direction::Column,
            children: Vec::new(),
        }
    }

    /// Append a leaf column.
    pub fn child(mut self, spec: ColumnSpec) -> Self {
        self.children.push(FlexItem::Column(spec));
        self
    }

    /// Append a nested container.
    pub fn nested(mut self, container: FlexContainer) -> Self {
        self.children.push(FlexItem::Container(container));
        self
    }

    /// Resolve every child against `available` columns.
    ///
    /// Row direction places children side by side; column direction stacks
    /// them at the full width with `gap` blank lines between. The returned
    /// items mirror the child order; nested containers carry their own
    /// resolved children with offsets relative to themselves.
    pub fn resolve(&self, available: u16) -> Vec<ResolvedItem> {
        match self.direction {
            Direction::Row => self.resolve_row_items(available),
            Direction::Column => self.resolve_column_items(available),
        }
    }

    /// Total height of this container at the given width.
    pub fn height(&self, available: u16) -> u16 {
        let items = self.resolve(available);
        match self.direction {
            Direction::Row => items.iter().map(|i| i.height).max().unwrap_or(0),
            Direction::Column => items
                .last()
                .map(|i| i.y_offset + i.height)
                .unwrap_or(0),
        }
    }

    fn resolve_row_items(&self, available: u16) -> Vec<ResolvedItem> {
        let specs: Vec<ColumnSpec> = self
            .children
            .iter()
            .map(|child| match child {
                FlexItem::Column(spec) => *spec,
                FlexItem::Container(_) => ColumnSpec::flex(1),
            })
            .collect();
        let extents = resolve_row(available, self.gap, &specs);
        self.children
            .iter()
            .zip(extents)
            .map(|(child, extent)| match child {
                FlexItem::Column(_) => ResolvedItem {
                    x_offset: extent.x_offset,
                    y_offset: 0,
                    width: extent.width,
                    height: 1,
                    children: Vec::new(),
                },
                FlexItem::Container(inner) => {
                    let children = inner.resolve(extent.width);
                    ResolvedItem {
                        x_offset: extent.x_offset,
                        y_offset: 0,
                        width: extent.width,
                        height: inner.height(extent.width),
                        children,
                    }
                }
            })
            .collect()
    }

    fn resolve_column_items(&self, available: u16) -> Vec<ResolvedItem> {
        let mut items = Vec::with_capacity(self.children.len());
        let mut y: u16 = 0;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                y = y.saturating_add(self.gap);
            }
            let item = match child {
                FlexItem::Column(_) => ResolvedItem {
                    x_offset: 0,
                    y_offset: y,
                    width: available,
                    height: 1,
                    children: Vec::new(),
                },
                FlexItem::Container(inner) => ResolvedItem {
                    x_offset: 0,
                    y_offset: y,
                    width: available,
                    height: inner.height(available),
                    children: inner.resolve(available),
                },
            };
            y = y.saturating_add(item.height);
            items.push(item);
        }
        items
    }
}

/// Splice `content` into `line` at a visual column offset.
///
/// Existing content before `x_offset` and past the spliced span is
/// preserved, so two columns sharing a line both stay visible. The line is
/// padded with spaces when it is shorter than `x_offset`. Styled content is
/// sealed with an SGR reset so its attributes cannot bleed into the
/// preserved tail.
///
/// # Example
///
/// ```
/// use liveregion::layout::merge_into;
///
/// let mut line = "left".to_string();
/// merge_into(&mut line, 10, "right");
/// assert_eq!(line, "left      right");
/// ```
pub fn merge_into(line: &mut String, x_offset: usize, content: &str) {
    let span = ansi::visual_width(content);
    let (head, _) = ansi::split_at_width(line, x_offset);
    let (_, tail) = ansi::split_at_width(line, x_offset + span);

    let mut merged = ansi::pad_to_width(head, x_offset);
    merged.push_str(content);
    if content.contains('\x1b') && !content.ends_with(ansi::SGR_RESET) {
        merged.push_str(ansi::SGR_RESET);
    }
    // Pad the span itself so the preserved tail stays in place
    let covered = x_offset + span;
    merged = ansi::pad_to_width(&merged, covered);
    merged.push_str(tail);
    *line = merged;
}
