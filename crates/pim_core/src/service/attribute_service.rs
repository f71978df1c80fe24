//! Attribute use-case service.
//!
//! # Invariants
//! - Attribute writes go through the same pre-save hooks as family writes.
//! - Hooks see the attribute read-only.

use crate::hooks::{default_hooks, run_pre_save_hooks, PreSaveHook, SaveSubject};
use crate::model::attribute::{Attribute, AttributeType};
use crate::repo::attribute_repo::AttributeRepository;
use crate::repo::RepoResult;
use log::info;

/// Use-case service wrapper for attribute definitions.
pub struct AttributeService<R: AttributeRepository> {
    repo: R,
    hooks: Vec<Box<dyn PreSaveHook>>,
}

impl<R: AttributeRepository> AttributeService<R> {
    /// Creates a service with the default hooks.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            hooks: default_hooks(),
        }
    }

    pub fn with_hook(mut self, hook: impl PreSaveHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Validates, runs pre-save hooks, then creates the attribute.
    pub fn create_attribute(
        &self,
        code: impl Into<String>,
        attribute_type: AttributeType,
    ) -> RepoResult<Attribute> {
        let attribute = Attribute::new(code, attribute_type);
        attribute.validate()?;

        run_pre_save_hooks(&self.hooks, SaveSubject::Attribute(&attribute));
        self.repo.create_attribute(&attribute)?;
        info!(
            "event=attribute_create module=service status=ok attribute={} type={}",
            attribute.code,
            attribute.attribute_type.as_str()
        );
        Ok(attribute)
    }

    pub fn get_attribute(&self, code: &str) -> RepoResult<Option<Attribute>> {
        self.repo.get_attribute(code)
    }

    pub fn list_attributes(&self) -> RepoResult<Vec<Attribute>> {
        self.repo.list_attributes()
    }
}

#[cfg(test)]
mod tests {
    use super::AttributeService;
    use crate::db::open_db_in_memory;
    use crate::hooks::{PreSaveHook, SaveSubject};
    use crate::model::attribute::{Attribute, AttributeType};
    use crate::repo::attribute_repo::SqliteAttributeRepository;
    use crate::repo::RepoError;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct KindRecorder(Rc<RefCell<Vec<&'static str>>>);

    impl PreSaveHook for KindRecorder {
        fn name(&self) -> &'static str {
            "kind_recorder"
        }

        fn pre_save(&self, subject: SaveSubject<'_>) {
            self.0.borrow_mut().push(subject.kind());
        }
    }

    #[test]
    fn create_attribute_runs_hooks_then_persists() {
        let conn = open_db_in_memory().unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let service = AttributeService::new(SqliteAttributeRepository::try_new(&conn).unwrap())
            .with_hook(KindRecorder(Rc::clone(&seen)));

        let created = service
            .create_attribute("color", AttributeType::SimpleSelect)
            .unwrap();

        assert_eq!(created, Attribute::new("color", AttributeType::SimpleSelect));
        assert_eq!(*seen.borrow(), vec!["attribute"]);
        assert_eq!(service.get_attribute("color").unwrap(), Some(created));
    }

    #[test]
    fn invalid_code_never_reaches_hooks() {
        let conn = open_db_in_memory().unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let service = AttributeService::new(SqliteAttributeRepository::try_new(&conn).unwrap())
            .with_hook(KindRecorder(Rc::clone(&seen)));

        let err = service
            .create_attribute("not a code", AttributeType::Text)
            .err()
            .unwrap();
        assert!(matches!(err, RepoError::Validation(_)));
        assert!(seen.borrow().is_empty());
        assert!(service.list_attributes().unwrap().is_empty());
    }
}
