use di_abstractions::{CompositeObject, InjectionTarget, ScopeAware, ScopeHandle, SharedObject};
use inject_macros::injection_target;
use std::sync::Arc;

struct Panel;

#[injection_target(composite, scope_aware)]
impl Panel {
    fn inject_theme(&self, #[inject(id = "theme")] theme: Option<Arc<String>>, width: u32) {
        let _ = (theme, width);
    }

    fn inject_count(&self) -> usize {
        1
    }

    #[inject(skip)]
    fn inject_ignored(&self) {}

    fn reset(&mut self) {}
}

impl CompositeObject for Panel {
    fn constituents(&self) -> Vec<SharedObject> {
        Vec::new()
    }
}

impl ScopeAware for Panel {
    fn attach_scope(&self, _handle: ScopeHandle) {}
}

fn main() {
    let panel = Panel;
    let names: Vec<&str> = panel.injection_methods().iter().map(|m| m.name()).collect();
    assert_eq!(names, ["inject_theme", "inject_count"]);
    assert!(panel.as_composite().is_some());
    assert!(panel.as_scope_aware().is_some());
}
