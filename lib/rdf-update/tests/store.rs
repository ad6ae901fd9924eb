#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use rdf_update::acl::{AccessControlList, AccessKind, GraphSelector};
use rdf_update::error::UpdateEvaluationError;
use rdf_update::execution::{TermPosition, UpdateError, ValidationRule};
use rdf_update::model::{
    GraphName, GraphNamePattern, GraphNameRef, Literal, LiteralRef, NamedNode, NamedNodeRef,
    QuadPattern, QuadRef, Variable,
};
use rdf_update::store::Store;
use std::error::Error;

const GRAPH_1: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://graph_1");
const GRAPH_2: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://graph_2");
const S: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://example.com/s");
const P: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://example.com/p");
const P2: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://example.com/p2");
const Q: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://example.com/q");

fn monger_store() -> Store {
    Store::with_policy(
        AccessControlList::new().allow_all("monger", GraphSelector::from(GRAPH_1.into_owned())),
    )
}

#[tokio::test]
async fn duplicate_quads_in_insert_data_are_reported_once() -> Result<(), Box<dyn Error>> {
    let store = Store::new();
    let results = store
        .update(
            "INSERT DATA { <http://example.com/s> <http://example.com/p> \"o\" . <http://example.com/s> <http://example.com/p> \"o\" }",
        )
        .await?;

    assert_eq!(
        results[0].inserted(),
        Some(
            [QuadRef::new(
                S,
                P,
                LiteralRef::new_simple_literal("o"),
                GraphNameRef::DefaultGraph
            )
            .into_owned()]
            .as_slice()
        )
    );
    assert_eq!(store.len().await?, 1);
    Ok(())
}

#[tokio::test]
async fn modify_reports_each_quad_once() -> Result<(), Box<dyn Error>> {
    let store = Store::new();
    store
        .extend([
            QuadRef::new(S, P, LiteralRef::new_simple_literal("o"), GraphNameRef::DefaultGraph),
            QuadRef::new(S, Q, LiteralRef::new_simple_literal("1"), GraphNameRef::DefaultGraph),
            QuadRef::new(S, Q, LiteralRef::new_simple_literal("2"), GraphNameRef::DefaultGraph),
        ])
        .await?;

    let results = store
        .update(
            "DELETE { ?s <http://example.com/p> ?o } INSERT { ?s <http://example.com/p2> ?o } WHERE { ?s <http://example.com/p> ?o . ?s <http://example.com/q> ?x }",
        )
        .await?;

    let moved = Literal::new_simple_literal("o");
    assert_eq!(results[0].deleted().map(<[_]>::len), Some(1));
    assert_eq!(results[0].inserted().map(<[_]>::len), Some(1));
    assert!(
        store
            .contains(QuadRef::new(S, P2, moved.as_ref(), GraphNameRef::DefaultGraph))
            .await?
    );
    assert!(
        !store
            .contains(QuadRef::new(S, P, moved.as_ref(), GraphNameRef::DefaultGraph))
            .await?
    );
    Ok(())
}

#[tokio::test]
async fn variables_in_data_are_rejected() -> Result<(), Box<dyn Error>> {
    let store = Store::new();
    store
        .extend([QuadRef::new(S, P, S, GraphNameRef::DefaultGraph)])
        .await?;
    let pattern = QuadPattern {
        subject: Variable::new_unchecked("s").into(),
        predicate: P.into_owned().into(),
        object: S.into_owned().into(),
        graph_name: GraphNamePattern::DefaultGraph,
    };

    let error = store.insert_data(&[pattern], None).await.unwrap_err();

    let UpdateEvaluationError::Update(UpdateError::DataValidation(error)) = &error else {
        panic!("unexpected error: {error}");
    };
    assert_eq!(error.position(), TermPosition::Subject);
    assert_eq!(error.rule(), ValidationRule::NonGroundTerm);
    insta::assert_snapshot!(error, @"Variables not permitted in data: ?s in subject position");
    assert_eq!(store.len().await?, 1);
    Ok(())
}

#[tokio::test]
async fn literal_subjects_in_data_are_rejected() -> Result<(), Box<dyn Error>> {
    let store = Store::new();
    let pattern = QuadPattern {
        subject: Literal::new_simple_literal("s").into(),
        predicate: P.into_owned().into(),
        object: S.into_owned().into(),
        graph_name: GraphNamePattern::DefaultGraph,
    };

    let error = store.insert_data(&[pattern], None).await.unwrap_err();

    insta::assert_snapshot!(error, @r#"Literals not allowed as subjects in data: "s" in subject position"#);
    assert!(store.is_empty().await?);
    Ok(())
}

#[tokio::test]
async fn variables_in_insert_data_text_are_syntax_errors() {
    let store = Store::new();
    let error = store
        .update("INSERT DATA { ?s <http://example.com/p> <http://example.com/o> }")
        .await
        .unwrap_err();
    assert!(matches!(error, UpdateEvaluationError::Parsing(_)));
}

#[tokio::test]
async fn monger_may_only_update_graph_1() -> Result<(), Box<dyn Error>> {
    let store = monger_store();
    let update = r#"
        INSERT {
            GRAPH ?g {
                <http://example.com/s> <http://example.com/p> "1" .
                <http://example.com/s> <http://example.com/p> "2" .
            }
            GRAPH ?g2 {
                <http://example.com/s> <http://example.com/p> "3" .
            }
        }
        WHERE {
            BIND(<http://graph_1> AS ?g)
            BIND(<http://graph_2> AS ?g2)
        }
    "#;

    let error = store.update_as(update, "monger").await.unwrap_err();
    let UpdateEvaluationError::Update(UpdateError::AccessDenied(denied)) = &error else {
        panic!("unexpected error: {error}");
    };
    assert_eq!(denied.user(), "monger");
    assert_eq!(denied.graph(), &GraphName::from(GRAPH_2.into_owned()));
    assert_eq!(denied.kind(), AccessKind::Update);
    assert!(store.is_empty().await?);

    let results = store.update_as(update, "admin").await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].deleted().map(<[_]>::len), Some(0));
    assert_eq!(results[0].inserted().map(<[_]>::len), Some(3));
    assert_eq!(
        store
            .quads_for_pattern(None, None, None, None, Some(GRAPH_1.into()))
            .await?
            .len(),
        2
    );
    Ok(())
}

#[tokio::test]
async fn failed_batch_leaves_earlier_operations_unapplied() -> Result<(), Box<dyn Error>> {
    let store = monger_store();
    let error = store
        .update_as(
            "INSERT DATA { GRAPH <http://graph_1> { <http://example.com/s> <http://example.com/p> 1 } } ; INSERT DATA { GRAPH <http://graph_2> { <http://example.com/s> <http://example.com/p> 2 } }",
            "monger",
        )
        .await
        .unwrap_err();

    insta::assert_snapshot!(error, @"User 'monger' is not allowed to insert_data on graph <http://graph_2>");
    assert!(store
        .quads_for_pattern(None, None, None, None, Some(GRAPH_1.into()))
        .await?
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn reads_are_filtered_by_user() -> Result<(), Box<dyn Error>> {
    let store = monger_store();
    store
        .extend([
            QuadRef::new(S, P, S, GRAPH_1),
            QuadRef::new(S, P, S, GRAPH_2),
            QuadRef::new(S, P, S, GraphNameRef::DefaultGraph),
        ])
        .await?;

    let visible = store
        .quads_for_pattern(Some("monger"), Some(S.into()), None, None, None)
        .await?;
    assert_eq!(visible, vec![QuadRef::new(S, P, S, GRAPH_1).into_owned()]);
    assert_eq!(
        store.named_graphs(Some("monger")).await?,
        vec![GRAPH_1.into_owned().into()]
    );
    assert_eq!(store.named_graphs(None).await?.len(), 2);
    assert_eq!(
        store
            .quads_for_pattern(Some("admin"), None, None, None, None)
            .await?
            .len(),
        3
    );
    Ok(())
}

#[tokio::test]
async fn insert_and_remove_bypass_policy() -> Result<(), Box<dyn Error>> {
    let store = monger_store();
    let quad = QuadRef::new(S, P, S, GRAPH_2);

    assert!(store.insert(quad).await?);
    assert!(!store.insert(quad).await?);
    assert!(store.contains(quad).await?);
    assert!(store.contains_named_graph(GRAPH_2.into()).await?);
    assert!(store.remove(quad).await?);
    assert!(!store.remove(quad).await?);
    store.validate().await?;
    Ok(())
}

#[tokio::test]
async fn parse_update_lowers_operations() -> Result<(), Box<dyn Error>> {
    let store = Store::new();
    let operations = store.parse_update(
        "CREATE GRAPH <http://graph_1> ; INSERT DATA { GRAPH <http://graph_1> { <http://example.com/s> <http://example.com/p> 1 } }",
    )?;
    assert_eq!(operations.len(), 2);

    let results = store.execute(&operations, None).await?;
    assert_eq!(results.len(), 2);
    assert!(store
        .contains_named_graph(NamedNode::new_unchecked("http://graph_1").as_ref().into())
        .await?);
    Ok(())
}

#[tokio::test]
async fn graph_transfers_yield_one_result_each() -> Result<(), Box<dyn Error>> {
    let store = Store::new();
    store
        .insert(QuadRef::new(S, P, LiteralRef::new_simple_literal("o"), GRAPH_1))
        .await?;

    let results = store
        .update("COPY <http://graph_1> TO <http://graph_2> ; MOVE <http://graph_2> TO DEFAULT")
        .await?;
    assert_eq!(results.len(), 2);
    assert!(!store.contains_named_graph(GRAPH_2.into()).await?);
    let moved = QuadRef::new(
        S,
        P,
        LiteralRef::new_simple_literal("o"),
        GraphNameRef::DefaultGraph,
    );
    assert!(store.contains(moved).await?);

    let results = store.update("ADD SILENT DEFAULT TO <http://graph_2>").await?;
    assert_eq!(results.len(), 1);
    assert_eq!(store.len().await?, 3);
    Ok(())
}

#[tokio::test]
async fn copy_from_missing_graph_is_an_error() {
    let store = Store::new();
    let error = store
        .update("COPY <http://missing> TO <http://graph_2>")
        .await
        .unwrap_err();
    insta::assert_snapshot!(error, @"The graph <http://missing> does not exist");

    let results = store
        .update("COPY SILENT <http://missing> TO <http://graph_2>")
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn copy_requires_query_on_source() -> Result<(), Box<dyn Error>> {
    let store = Store::with_policy(AccessControlList::new().allow(
        "u",
        GraphSelector::from(GRAPH_2.into_owned()),
        [
            AccessKind::Update,
            AccessKind::Clear,
            AccessKind::Drop,
            AccessKind::Query,
        ],
    ));
    let kept = QuadRef::new(S, P, LiteralRef::new_simple_literal("b"), GRAPH_2);
    store
        .insert(QuadRef::new(S, P, LiteralRef::new_simple_literal("a"), GRAPH_1))
        .await?;
    store.insert(kept).await?;

    let error = store
        .update_as("COPY <http://graph_1> TO <http://graph_2>", "u")
        .await
        .unwrap_err();
    insta::assert_snapshot!(error, @"User 'u' is not allowed to query on graph <http://graph_1>");
    assert_eq!(
        store
            .quads_for_pattern(None, None, None, None, Some(GRAPH_2.into()))
            .await?,
        vec![kept.into_owned()]
    );
    Ok(())
}
