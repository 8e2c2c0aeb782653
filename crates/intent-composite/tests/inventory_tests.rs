//! Inventory threading through list and validate

use intent_composite::CompositeIntent;
use intent_core::{Intent, Inventory};
use intent_test_utils::{Op, ProbeIntent, TestResource};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

type Root = CompositeIntent<TestResource, ()>;

fn composite(name: &str) -> Root {
    CompositeIntent::new(name, Arc::new(()))
}

fn device() -> TestResource {
    TestResource::new("leaf1")
}

async fn add(root: &Root, probe: &Arc<ProbeIntent>) {
    root.add_child(probe.name(), Arc::clone(probe) as Arc<dyn Intent<TestResource>>)
        .await;
}

#[tokio::test]
async fn test_list_collects_every_child_contribution() {
    let root = composite("root");
    let a = Arc::new(ProbeIntent::new("a").contributing("k", "r1"));
    let b = Arc::new(ProbeIntent::new("b").contributing("k", "r2"));
    add(&root, &a).await;
    add(&root, &b).await;

    let inventory = root
        .list(&CancellationToken::new(), &device(), Inventory::new())
        .await
        .unwrap();

    assert!(inventory.contains("k", "r1"));
    assert!(inventory.contains("k", "r2"));
    assert_eq!(inventory.len(), 2);
}

#[tokio::test]
async fn test_each_child_sees_previous_contributions() {
    let root = composite("root");
    let a = Arc::new(ProbeIntent::new("a").contributing("k", "r1"));
    let b = Arc::new(ProbeIntent::new("b").contributing("k", "r2"));
    add(&root, &a).await;
    add(&root, &b).await;

    let mut start = Inventory::new();
    start.insert("k", "r0");

    let inventory = root
        .validate(&CancellationToken::new(), &device(), start)
        .await
        .unwrap();

    // Sequential threading: one child saw only the caller's entry, the other
    // saw that plus the first child's.
    let mut seen: Vec<usize> = a
        .seen_inventory_sizes()
        .into_iter()
        .chain(b.seen_inventory_sizes())
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2]);

    for id in ["r0", "r1", "r2"] {
        assert!(inventory.contains("k", id), "{id}");
    }
}

#[tokio::test]
async fn test_threading_crosses_nested_composites() {
    let root = composite("root");
    let site = Arc::new(composite("site"));
    let a = Arc::new(ProbeIntent::new("a").contributing("Interface", "eth0"));
    let b = Arc::new(ProbeIntent::new("b").contributing("Interface", "eth1"));
    let c = Arc::new(ProbeIntent::new("c").contributing("Vlan", "100"));
    add(&site, &a).await;
    add(&site, &b).await;
    root.add_child("site", Arc::clone(&site) as Arc<dyn Intent<TestResource>>)
        .await;
    add(&root, &c).await;

    let inventory = root
        .list(&CancellationToken::new(), &device(), Inventory::new())
        .await
        .unwrap();

    let mut seen: Vec<usize> = [&a, &b, &c]
        .iter()
        .flat_map(|probe| probe.seen_inventory_sizes())
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2]);

    assert_eq!(inventory.kinds().collect::<Vec<_>>(), vec!["Interface", "Vlan"]);
    assert_eq!(inventory.len(), 3);
}

#[tokio::test]
async fn test_list_failure_returns_error_not_partial_inventory() {
    let root = composite("root");
    add(&root, &Arc::new(ProbeIntent::new("a").contributing("k", "r1"))).await;
    add(&root, &Arc::new(ProbeIntent::new("b").failing_on(Op::List))).await;

    let result = root
        .list(&CancellationToken::new(), &device(), Inventory::new())
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_validate_and_list_are_counted_separately() {
    let root = composite("root");
    let a = Arc::new(ProbeIntent::new("a"));
    add(&root, &a).await;
    let cancel = CancellationToken::new();

    let inventory = root.list(&cancel, &device(), Inventory::new()).await.unwrap();
    let inventory = root.validate(&cancel, &device(), inventory).await.unwrap();

    assert!(inventory.is_empty());
    assert_eq!(a.calls(Op::List), 1);
    assert_eq!(a.calls(Op::Validate), 1);
}

proptest! {
    #[test]
    fn prop_list_result_is_union_of_contributions(
        initial in proptest::collection::vec(("[a-c]", "[a-z]{1,2}"), 0..5),
        children in proptest::collection::vec(
            proptest::collection::vec(("[a-c]", "[a-z]{1,2}"), 0..5),
            0..6,
        ),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let inventory = runtime.block_on(async {
            let root = composite("root");
            for (i, contributions) in children.iter().enumerate() {
                let probe = contributions
                    .iter()
                    .fold(ProbeIntent::new(format!("p{i}")), |probe, (kind, id)| {
                        probe.contributing(kind.as_str(), id.as_str())
                    });
                add(&root, &Arc::new(probe)).await;
            }
            let start: Inventory = initial.iter().cloned().collect();
            root.list(&CancellationToken::new(), &device(), start).await.unwrap()
        });

        let expected: BTreeSet<(String, String)> = initial
            .iter()
            .chain(children.iter().flatten())
            .cloned()
            .collect();

        prop_assert_eq!(inventory.len(), expected.len());
        for (kind, id) in &expected {
            prop_assert!(inventory.contains(kind, id));
        }
    }
}
