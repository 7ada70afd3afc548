//! Reclamation pass
//!
//! Marks every instance reachable from a held instance (through fields and
//! any aggregates nested in them) and sweeps the rest. Sweeping bumps the
//! slot generation so stale identities can never alias a new instance.

use tracing::debug;

use super::{Heap, ObjectId};

impl Heap {
    /// Run a reclamation pass. Returns how many instances were reclaimed.
    pub fn collect(&mut self) -> usize {
        let marked = self.mark();

        let mut reclaimed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.instance.is_some() && !marked[index] {
                slot.instance = None;
                slot.holds = 0;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                reclaimed += 1;
            }
        }

        self.live -= reclaimed;
        self.stats.collections += 1;
        self.stats.reclaimed += reclaimed;
        debug!(reclaimed, live = self.live, "reclamation pass finished");
        reclaimed
    }

    fn mark(&self) -> Vec<bool> {
        let mut marked = vec![false; self.slots.len()];
        let mut pending: Vec<usize> = Vec::new();

        for (index, slot) in self.slots.iter().enumerate() {
            if slot.holds > 0 && slot.instance.is_some() {
                marked[index] = true;
                pending.push(index);
            }
        }

        while let Some(index) = pending.pop() {
            let Some(instance) = &self.slots[index].instance else {
                continue;
            };
            for (_, value) in instance.iter() {
                value.for_each_object(&mut |id: ObjectId| {
                    let target = id.index();
                    if self.is_live(id) && !marked[target] {
                        marked[target] = true;
                        pending.push(target);
                    }
                });
            }
        }
        marked
    }
}
