use super::host::{BoxSize, RenderHost, ScrollOffset};
use super::scheduler::LayoutScope;

#[derive(Debug, Clone, PartialEq)]
struct RegionSnapshot {
    region: String,
    scroll: Option<ScrollOffset>,
    frozen: Option<BoxSize>,
}

/// A transaction whose mutation has run and whose restore is waiting on
/// frame boundaries
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRestore {
    scope: LayoutScope,
    regions: Vec<RegionSnapshot>,
    frames_remaining: u8,
}

impl PendingRestore {
    pub fn scope(&self) -> &LayoutScope {
        &self.scope
    }

    pub fn frames_remaining(&self) -> u8 {
        self.frames_remaining
    }

    /// Regions whose size is pinned until the restore runs
    pub fn frozen_regions(&self) -> impl Iterator<Item = &str> {
        self.regions
            .iter()
            .filter(|r| r.frozen.is_some())
            .map(|r| r.region.as_str())
    }

    /// Advance one frame boundary. Returns true once the restore has run.
    pub fn on_frame<H: RenderHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if self.frames_remaining > 1 {
            self.frames_remaining -= 1;
            return false;
        }
        self.frames_remaining = 0;
        self.restore(host);
        true
    }

    /// Run another mutation inside this transaction.
    ///
    /// Regions already captured keep their first snapshot, so the restore
    /// writes back the offset from before the earliest mutation. The scope
    /// widens and the settle countdown starts over.
    pub fn extend<H, R>(
        &mut self,
        host: &mut H,
        scope: &LayoutScope,
        settle_frames: u8,
        mutate: impl FnOnce(&mut H) -> R,
    ) -> R
    where
        H: RenderHost + ?Sized,
    {
        self.capture(host, scope);
        self.scope = self.scope.clone().merge(scope.clone());
        self.frames_remaining = settle_frames.max(1);
        mutate(host)
    }

    fn capture<H: RenderHost + ?Sized>(&mut self, host: &mut H, scope: &LayoutScope) {
        for region in host.scroll_regions(scope) {
            if self.regions.iter().any(|r| r.region == region) {
                continue;
            }
            let scroll = host.scroll_offset(&region);
            let frozen = host.box_size(&region);
            if let Some(size) = frozen {
                host.freeze_box(&region, size);
            }
            self.regions.push(RegionSnapshot {
                region,
                scroll,
                frozen,
            });
        }
    }

    fn restore<H: RenderHost + ?Sized>(&self, host: &mut H) {
        for snapshot in &self.regions {
            if let Some(offset) = snapshot.scroll {
                host.set_scroll_offset(&snapshot.region, offset);
            }
        }
        for snapshot in &self.regions {
            if snapshot.frozen.is_some() {
                host.release_box(&snapshot.region);
            }
        }
        tracing::debug!(scope = %self.scope, regions = self.regions.len(), "scroll positions restored");
    }
}

/// Run `mutate` with scroll offsets captured and region sizes frozen.
///
/// Every scroll region the scope can shift has its offset captured and its
/// box pinned before the mutation. The restore waits for `settle_frames`
/// frame boundaries (layout has not settled after one), writes the offsets
/// back verbatim and only then releases the pinned sizes.
///
/// Returns the mutation's result and the pending restore, which the caller
/// drives with [`PendingRestore::on_frame`] at each frame boundary.
pub fn with_preserved_layout<H, R>(
    host: &mut H,
    scope: &LayoutScope,
    settle_frames: u8,
    mutate: impl FnOnce(&mut H) -> R,
) -> (R, PendingRestore)
where
    H: RenderHost + ?Sized,
{
    let mut pending = PendingRestore {
        scope: scope.clone(),
        regions: Vec::new(),
        frames_remaining: settle_frames.max(1),
    };
    pending.capture(host, scope);
    let result = mutate(host);
    (result, pending)
}
