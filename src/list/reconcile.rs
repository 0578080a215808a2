//! Reconciling a list against an externally observed ordering.

use std::rc::Rc;

use super::MarkList;
use crate::events::Event;

impl<T> MarkList<T> {
    /// Rebuilds the list so its display keys follow `displayed`.
    ///
    /// Items whose key still appears are kept (and reported as reordered if
    /// their position changed), keys that are new get an item synthesized by
    /// the codec, and items whose key vanished are reported as removed. All
    /// events are emitted before the list is replaced, in one assignment.
    ///
    /// A key repeated in `displayed` only reuses the existing item once; later
    /// repeats are synthesized afresh. Keys the codec can't create an item for
    /// are dropped, and event indices are positions in the rebuilt list.
    pub fn reconcile(&mut self, displayed: &[String]) -> &mut Self {
        let current = self.display();
        let bus = Rc::clone(&self.bus);

        for (i, key) in current.iter().enumerate() {
            if !displayed.contains(key) {
                bus.emit(&Event::Remove {
                    list: self,
                    item: &self.items[i],
                    index: i + 1,
                });
            }
        }

        // `Ok(j)` reuses old item j, `Err(item)` is a fresh item.
        let mut plan: Vec<Result<usize, T>> = Vec::with_capacity(displayed.len());

        for key in displayed {
            let index = plan.len() + 1;
            let reusable = current
                .iter()
                .position(|existing| existing == key)
                .filter(|&j| !self.already_placed(&self.items[j], &plan));

            match reusable {
                Some(j) => {
                    if j + 1 != index {
                        bus.emit(&Event::Reorder {
                            list: self,
                            item: &self.items[j],
                            index,
                        });
                    }
                    plan.push(Ok(j));
                }
                None => {
                    let Some(item) = self.config.codec.create_list_item(Some(key.as_str())) else {
                        log::warn!("List '{}': no item for key '{}'", self.name, key);
                        continue;
                    };
                    bus.emit(&Event::Add {
                        list: self,
                        item: &item,
                        index,
                    });
                    plan.push(Err(item));
                }
            }
        }

        let mut old: Vec<Option<T>> = std::mem::take(&mut self.items)
            .into_iter()
            .map(Some)
            .collect();
        let items: Vec<T> = plan
            .into_iter()
            .filter_map(|slot| match slot {
                Ok(j) => old[j].take(),
                Err(item) => Some(item),
            })
            .collect();

        log::debug!(
            "List '{}': reconciled {} -> {} items",
            self.name,
            current.len(),
            items.len()
        );
        self.items = items;
        self.clamp_cursor();
        self
    }

    /// True if an item equal to `candidate` is already in the rebuilt sequence.
    fn already_placed(&self, candidate: &T, plan: &[Result<usize, T>]) -> bool {
        plan.iter().any(|slot| {
            let placed = match slot {
                Ok(k) => &self.items[*k],
                Err(item) => item,
            };
            self.config.codec.equals(placed, candidate)
        })
    }
}
