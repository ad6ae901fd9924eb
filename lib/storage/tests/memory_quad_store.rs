use rdf_update_common::{QuadReader, QuadStore, QuadStoreTransaction};
use rdf_update_model::{
    GraphName, GraphNameRef, Literal, NamedNode, NamedOrBlankNode, Quad, Subject, Term,
    TripleFilter,
};
use rdf_update_storage::MemoryQuadStore;

fn example_quad() -> Quad {
    Quad::new(
        Subject::NamedNode(NamedNode::new("http://example.com/subject").unwrap()),
        NamedNode::new("http://example.com/predicate").unwrap(),
        Term::Literal(Literal::new_simple_literal("value")),
        GraphName::DefaultGraph,
    )
}

fn example_quad_in_graph(graph: &str) -> Quad {
    Quad::new(
        Subject::NamedNode(NamedNode::new("http://example.com/subject").unwrap()),
        NamedNode::new("http://example.com/predicate").unwrap(),
        Term::Literal(Literal::new_simple_literal("value")),
        GraphName::NamedNode(NamedNode::new(graph).unwrap()),
    )
}

fn example_graph() -> NamedOrBlankNode {
    NamedOrBlankNode::NamedNode(NamedNode::new("http://example.com/graph").unwrap())
}

#[tokio::test]
async fn test_insert_quad() {
    let store = MemoryQuadStore::new();

    let inserted = store.extend(vec![example_quad()]).await.unwrap();
    assert_eq!(inserted, 1);

    let len = store.len().await.unwrap();
    assert_eq!(len, 1);
    store.validate().await.unwrap();
}

#[tokio::test]
async fn test_insert_duplicate_quads_no_effect() {
    let store = MemoryQuadStore::new();

    store.extend(vec![example_quad()]).await.unwrap();

    let inserted = store.extend(vec![example_quad()]).await.unwrap();
    assert_eq!(inserted, 0);
}

#[tokio::test]
async fn test_insert_duplicate_quads_in_same_operation() {
    let store = MemoryQuadStore::new();

    let inserted = store
        .extend(vec![example_quad(), example_quad()])
        .await
        .unwrap();

    assert_eq!(inserted, 1);
    store.validate().await.unwrap();
}

#[tokio::test]
async fn test_named_graph_insertion_and_query() {
    let store = MemoryQuadStore::new();
    let graph = example_graph();

    let mut transaction = store.begin_write().await.unwrap();
    assert!(transaction.insert_named_graph(graph.as_ref()).await.unwrap());
    assert!(!transaction.insert_named_graph(graph.as_ref()).await.unwrap());
    transaction.commit().await.unwrap();

    assert!(store.contains_named_graph(graph.as_ref()).await.unwrap());
    assert_eq!(store.named_graphs().await.unwrap(), vec![graph]);
    assert_eq!(store.len().await.unwrap(), 0);
}

#[tokio::test]
async fn test_named_graph_exists_while_it_has_quads() {
    let store = MemoryQuadStore::new();
    let quad = example_quad_in_graph("http://example.com/graph");
    let graph = example_graph();

    store.extend(vec![quad.clone()]).await.unwrap();
    assert!(store.contains_named_graph(graph.as_ref()).await.unwrap());

    let mut transaction = store.begin_write().await.unwrap();
    assert!(transaction.remove(quad.as_ref()).await.unwrap());
    transaction.commit().await.unwrap();

    assert!(!store.contains_named_graph(graph.as_ref()).await.unwrap());
    assert!(store.named_graphs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_created_graph_survives_removal_of_its_quads() {
    let store = MemoryQuadStore::new();
    let quad = example_quad_in_graph("http://example.com/graph");
    let graph = example_graph();

    let mut transaction = store.begin_write().await.unwrap();
    transaction.insert_named_graph(graph.as_ref()).await.unwrap();
    transaction.insert(quad.as_ref()).await.unwrap();
    transaction.remove(quad.as_ref()).await.unwrap();
    transaction.commit().await.unwrap();

    assert!(store.contains_named_graph(graph.as_ref()).await.unwrap());
}

#[tokio::test]
async fn test_remove_named_graph_removes_content() {
    let store = MemoryQuadStore::new();
    let graph = example_graph();
    store
        .extend(vec![
            example_quad(),
            example_quad_in_graph("http://example.com/graph"),
            example_quad_in_graph("http://example.com/other"),
        ])
        .await
        .unwrap();

    let mut transaction = store.begin_write().await.unwrap();
    assert!(transaction.remove_named_graph(graph.as_ref()).await.unwrap());
    assert!(!transaction.remove_named_graph(graph.as_ref()).await.unwrap());
    transaction.commit().await.unwrap();

    assert_eq!(store.len().await.unwrap(), 2);
    assert!(!store.contains_named_graph(graph.as_ref()).await.unwrap());
    store.validate().await.unwrap();
}

#[tokio::test]
async fn test_find_by_pattern() {
    let store = MemoryQuadStore::new();
    store
        .extend(vec![
            example_quad(),
            example_quad_in_graph("http://example.com/graph"),
        ])
        .await
        .unwrap();
    let predicate = NamedNode::new("http://example.com/predicate").unwrap();
    let filter = TripleFilter::any().with_predicate(predicate.as_ref());

    assert_eq!(store.find_in_default_graph(filter).await.unwrap().len(), 1);
    assert_eq!(store.find_in_any_named_graph(filter).await.unwrap().len(), 1);
    assert_eq!(
        store
            .find_in_named_graph(example_graph().as_ref(), filter)
            .await
            .unwrap(),
        vec![example_quad_in_graph("http://example.com/graph")]
    );
    assert_eq!(store.find(None, filter).await.unwrap().len(), 2);
    assert_eq!(
        store
            .find(Some(GraphNameRef::DefaultGraph), filter)
            .await
            .unwrap(),
        vec![example_quad()]
    );

    let other = NamedNode::new("http://example.com/other").unwrap();
    assert!(store
        .find(None, TripleFilter::any().with_object(other.as_ref()))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_contains() {
    let store = MemoryQuadStore::new();
    store.extend(vec![example_quad()]).await.unwrap();

    assert!(store.contains(example_quad().as_ref()).await.unwrap());
    assert!(!store
        .contains(example_quad_in_graph("http://example.com/graph").as_ref())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_abort_discards_changes() {
    let store = MemoryQuadStore::new();
    store.extend(vec![example_quad()]).await.unwrap();

    let mut transaction = store.begin_write().await.unwrap();
    transaction
        .insert(example_quad_in_graph("http://example.com/graph").as_ref())
        .await
        .unwrap();
    transaction.remove(example_quad().as_ref()).await.unwrap();
    assert_eq!(transaction.len().await.unwrap(), 1);
    transaction.abort().await.unwrap();

    assert!(store.contains(example_quad().as_ref()).await.unwrap());
    assert_eq!(store.len().await.unwrap(), 1);
}

#[tokio::test]
async fn test_readers_see_committed_state_only() {
    let store = MemoryQuadStore::new();

    let mut transaction = store.begin_write().await.unwrap();
    transaction.insert(example_quad().as_ref()).await.unwrap();
    assert!(transaction.contains(example_quad().as_ref()).await.unwrap());
    assert!(!store.contains(example_quad().as_ref()).await.unwrap());
    transaction.commit().await.unwrap();

    assert!(store.contains(example_quad().as_ref()).await.unwrap());
}

#[tokio::test]
async fn test_dropped_transaction_releases_writer() {
    let store = MemoryQuadStore::new();
    {
        let mut transaction = store.begin_write().await.unwrap();
        transaction.insert(example_quad().as_ref()).await.unwrap();
    }

    let transaction = store.begin_write().await.unwrap();
    transaction.commit().await.unwrap();
    assert_eq!(store.len().await.unwrap(), 0);
}
