//! Pre-save hooks run by the save services.
//!
//! # Responsibility
//! - Define the typed subject handed to hooks before a write.
//! - Host consistency cascades that must run after validation succeeds.
//!
//! # Invariants
//! - Hooks run only after validation reported no violation.
//! - Hooks mutate the subject in memory; they never persist anything.

pub mod variant_pruning;

use crate::model::attribute::Attribute;
use crate::model::family::Family;
use log::debug;

pub use variant_pruning::RemoveAttributeFromFamilyVariants;

/// Entity about to be persisted.
#[derive(Debug)]
pub enum SaveSubject<'a> {
    Family(&'a mut Family),
    Attribute(&'a Attribute),
}

impl SaveSubject<'_> {
    /// Short entity kind used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Family(_) => "family",
            Self::Attribute(_) => "attribute",
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Family(family) => &family.code,
            Self::Attribute(attribute) => &attribute.code,
        }
    }

    /// Shorter-lived subject over the same entity, one per hook call.
    fn reborrow(&mut self) -> SaveSubject<'_> {
        match self {
            Self::Family(family) => SaveSubject::Family(&mut **family),
            Self::Attribute(attribute) => SaveSubject::Attribute(*attribute),
        }
    }
}

/// Callback invoked right before an entity is written.
pub trait PreSaveHook {
    fn name(&self) -> &'static str;
    fn pre_save(&self, subject: SaveSubject<'_>);
}

/// Default hooks, in execution order.
pub fn default_hooks() -> Vec<Box<dyn PreSaveHook>> {
    vec![Box::new(RemoveAttributeFromFamilyVariants)]
}

/// Hands `subject` to every hook in order.
pub fn run_pre_save_hooks(hooks: &[Box<dyn PreSaveHook>], mut subject: SaveSubject<'_>) {
    for hook in hooks {
        debug!(
            "event=pre_save_hook module=hooks status=start hook={} subject={} code={}",
            hook.name(),
            subject.kind(),
            subject.code()
        );
        hook.pre_save(subject.reborrow());
    }
}

#[cfg(test)]
mod tests {
    use super::{run_pre_save_hooks, PreSaveHook, SaveSubject};
    use crate::model::attribute::{Attribute, AttributeType};
    use crate::model::family::Family;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        label: &'static str,
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl PreSaveHook for Recorder {
        fn name(&self) -> &'static str {
            self.label
        }

        fn pre_save(&self, subject: SaveSubject<'_>) {
            self.seen
                .borrow_mut()
                .push(format!("{}:{}:{}", self.label, subject.kind(), subject.code()));
        }
    }

    #[test]
    fn every_hook_sees_the_subject_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let hooks: Vec<Box<dyn PreSaveHook>> = vec![
            Box::new(Recorder {
                label: "first",
                seen: Rc::clone(&seen),
            }),
            Box::new(Recorder {
                label: "second",
                seen: Rc::clone(&seen),
            }),
        ];
        let mut family = Family::new("shoes");

        run_pre_save_hooks(&hooks, SaveSubject::Family(&mut family));
        run_pre_save_hooks(
            &hooks,
            SaveSubject::Attribute(&Attribute::new("color", AttributeType::SimpleSelect)),
        );

        assert_eq!(
            *seen.borrow(),
            vec![
                "first:family:shoes",
                "second:family:shoes",
                "first:attribute:color",
                "second:attribute:color",
            ]
        );
    }
}
