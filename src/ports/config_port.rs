//! Configuration access port trait.
//!
//! Values come back as raw strings; `domain::checklist_config` parses and
//! validates them.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn sections(&self) -> Vec<String>;
}
