#![allow(clippy::panic, reason = "Benchmarks")]

use codspeed_criterion_compat::{criterion_group, criterion_main, Criterion};
use rand::seq::SliceRandom;
use rdf_update::acl::{AccessControlList, GraphSelector};
use rdf_update::model::{GraphName, NamedNode, Quad, Subject, Term};
use rdf_update::store::Store;
use tokio::runtime::Runtime;

fn store_insert_data(c: &mut Criterion) {
    c.bench_function("Store::update INSERT DATA", |b| {
        b.to_async(Runtime::new().unwrap()).iter(|| async {
            let store = Store::new();
            store.update(&insert_data(1_000)).await.unwrap();
        });
    });
}

fn store_modify(c: &mut Criterion) {
    c.bench_function("Store::update DELETE/INSERT", |b| {
        b.to_async(Runtime::new().unwrap()).iter(|| async {
            let store = Store::new();
            store.extend(generate_quads(1_000)).await.unwrap();
            store
                .update("DELETE { ?s ?p ?o } INSERT { ?o ?p ?s } WHERE { ?s ?p ?o }")
                .await
                .unwrap();
        });
    });
}

fn store_restricted_update(c: &mut Criterion) {
    c.bench_function("Store::update_as restricted", |b| {
        b.to_async(Runtime::new().unwrap()).iter(|| async {
            let acl = AccessControlList::new().allow_all("bench", GraphSelector::DefaultGraph);
            let store = Store::with_policy(acl);
            store.update_as(&insert_data(1_000), "bench").await.unwrap();
        });
    });
}

criterion_group!(
    store,
    store_insert_data,
    store_modify,
    store_restricted_update
);
criterion_main!(store);

fn insert_data(count: u64) -> String {
    let mut quads = generate_quads(count).collect::<Vec<_>>();
    quads.shuffle(&mut rand::rng());
    let triples = quads
        .iter()
        .map(|quad| format!("{} {} {} .", quad.subject, quad.predicate, quad.object))
        .collect::<Vec<_>>()
        .join("\n");
    format!("INSERT DATA {{ {triples} }}")
}

fn generate_quads(count: u64) -> impl Iterator<Item = Quad> {
    (0..count).map(|i| {
        let subject = format!("http://example.com/subject{i}");
        let predicate = format!("http://example.com/predicate{i}");
        let object = format!("http://example.com/object{i}");
        Quad::new(
            Subject::NamedNode(NamedNode::new_unchecked(subject)),
            NamedNode::new_unchecked(predicate),
            Term::NamedNode(NamedNode::new_unchecked(object)),
            GraphName::DefaultGraph,
        )
    })
}
