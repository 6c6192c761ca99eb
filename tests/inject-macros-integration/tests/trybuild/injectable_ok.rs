use di_abstractions::Injectable;
use inject_macros::Injectable;
use infrastructure_common::Disposable;
use std::sync::Arc;

#[derive(Injectable)]
struct Unit;

#[derive(Injectable)]
struct Pair(u32, #[inject(id = "label")] String);

#[derive(Injectable)]
#[inject(disposable)]
struct Client {
    #[inject(id = "retries", default = 3)]
    retries: u32,
    endpoint: Option<Arc<String>>,
    #[inject(skip)]
    calls: u64,
}

impl Disposable for Client {
    fn dispose(&self) {}
}

fn main() {
    assert_eq!(Unit::constructors().len(), 1);
    assert_eq!(Pair::constructors()[0].parameters().len(), 2);
    let constructor = &Client::constructors()[0];
    assert_eq!(constructor.parameters().len(), 2);
    assert!(constructor.parameters()[0].has_default());
    let _ = |client: &Client| (client.retries, client.endpoint.clone(), client.calls);
}
