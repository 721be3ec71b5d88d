//! Public-API walk: fold a pipeline, plan SQL eagerly, execute against a
//! canned backend and check the emitted paths.

use relgraph::config::CompilerConfig;
use relgraph::emit::{Emit, ExecutionError, Row, RowStream, StatementExecutor};
use relgraph::predicate::{HasContainer, Predicate};
use relgraph::sql::PostgresDialect;
use relgraph::strategy::{compile, CompileError};
use relgraph::topology::InMemoryTopology;
use relgraph::traversal::{Pipeline, Step};
use relgraph::types::SqlValue;

const TOPOLOGY: &str = r#"
schema: public
vertices:
  - label: person
    columns:
      name: text
      age: integer
  - label: software
    columns:
      lang: text
edges:
  - label: knows
    out: person
    in: person
    columns:
      weight: float
"#;

/// Canned backend: answers queries whose text contains a registered needle.
struct FakeBackend {
    responses: Vec<(&'static str, Vec<Row>)>,
    streaming: bool,
}

impl FakeBackend {
    fn new(responses: Vec<(&'static str, Vec<Row>)>) -> Self {
        FakeBackend {
            responses,
            streaming: false,
        }
    }
}

impl StatementExecutor for FakeBackend {
    fn execute_query(&self, sql: &str) -> Result<RowStream, ExecutionError> {
        for (needle, rows) in &self.responses {
            if sql.contains(needle) {
                let rows = rows.clone();
                return Ok(Box::new(rows.into_iter().map(Ok)));
            }
        }
        Err(ExecutionError::Backend(format!("unexpected query: {sql}")))
    }

    fn execute_statement(&self, _sql: &str) -> Result<(), ExecutionError> {
        Ok(())
    }

    fn is_batch_streaming(&self) -> bool {
        self.streaming
    }
}

fn row(pairs: &[(&str, SqlValue)]) -> Row {
    pairs
        .iter()
        .map(|(alias, value)| (alias.to_string(), value.clone()))
        .collect()
}

fn knows_pipeline() -> Pipeline {
    // g.V().as('a').has('name','marko').out('knows').has('age', gt(30))
    Pipeline::relational(vec![
        Step::vertex_source().labeled("a"),
        Step::has(vec![HasContainer::new("name", Predicate::eq("marko"))]),
        Step::out(&["knows"]),
        Step::has(vec![HasContainer::new("age", Predicate::gt(30))]),
    ])
}

#[test]
fn a_folded_traversal_executes_and_emits_labelled_paths() {
    let _ = env_logger::builder().is_test(true).try_init();
    let topology = InMemoryTopology::from_yaml_str(TOPOLOGY).unwrap();
    let config = CompilerConfig::default();

    let mut pipeline = knows_pipeline();
    let compiled = compile(&mut pipeline).expect("the source step compiles");
    compiled
        .parse_for_strategy(&topology, &PostgresDialect, &config)
        .unwrap();
    assert!(!compiled.is_for_multiple_queries());
    assert!(!compiled.may_query_during_build());

    let plans = compiled.plans().unwrap();
    assert_eq!(plans.len(), 1);
    let sql = &plans[0].statements[0].partitions[0].sql;
    assert!(sql.contains("INNER JOIN \"public\".\"E_knows\""));
    assert!(sql.contains("WHERE \"t0\".\"name\" = 'marko' AND \"t2\".\"age\" > 30"));

    let backend = FakeBackend::new(vec![(
        "INNER JOIN \"public\".\"E_knows\"",
        vec![
            row(&[
                ("a0_ID", SqlValue::Integer(1)),
                ("a0_name", SqlValue::from("marko")),
                ("a0_age", SqlValue::Integer(29)),
                ("a2_ID", SqlValue::Integer(4)),
                ("a2_name", SqlValue::from("josh")),
                ("a2_age", SqlValue::Integer(32)),
            ]),
            row(&[
                ("a0_ID", SqlValue::Integer(1)),
                ("a0_name", SqlValue::from("marko")),
                ("a0_age", SqlValue::Integer(29)),
                ("a2_ID", SqlValue::Integer(6)),
                ("a2_name", SqlValue::from("peter")),
                ("a2_age", SqlValue::Integer(35)),
            ]),
        ],
    )]);

    let emits: Vec<Emit> = compiled
        .elements(&topology, &PostgresDialect, &config, &backend)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(emits.len(), 2);
    for emit in &emits {
        assert_eq!(emit.path.len(), 2);
        // the source position carries the as('a') label
        assert_eq!(emit.labels[0], vec!["a".to_string()]);
        assert!(emit.labels[1].is_empty());
        // emitted elements satisfy the folded predicates
        assert!(emit.path[0].matches(&HasContainer::new("name", Predicate::eq("marko"))));
        assert!(emit.path[1].matches(&HasContainer::new("age", Predicate::gt(30))));
    }
    assert_eq!(emits[0].path[1].id(), 4);
    assert_eq!(emits[1].path[1].id(), 6);
}

#[test]
fn execution_is_refused_while_a_batch_stream_is_open() {
    let topology = InMemoryTopology::from_yaml_str(TOPOLOGY).unwrap();
    let config = CompilerConfig::default();

    let mut pipeline = knows_pipeline();
    let compiled = compile(&mut pipeline).expect("the source step compiles");

    let mut backend = FakeBackend::new(Vec::new());
    backend.streaming = true;
    let error = compiled
        .elements(&topology, &PostgresDialect, &config, &backend)
        .unwrap_err();
    assert_eq!(error, CompileError::Execution(ExecutionError::InvalidState));
}

#[test]
fn a_reset_iterator_replays_the_traversal() {
    let topology = InMemoryTopology::from_yaml_str(TOPOLOGY).unwrap();
    let config = CompilerConfig::default();

    let mut pipeline = knows_pipeline();
    let compiled = compile(&mut pipeline).expect("the source step compiles");

    let backend = FakeBackend::new(vec![(
        "INNER JOIN \"public\".\"E_knows\"",
        vec![row(&[
            ("a0_ID", SqlValue::Integer(1)),
            ("a2_ID", SqlValue::Integer(4)),
        ])],
    )]);

    let mut iterator = compiled
        .elements(&topology, &PostgresDialect, &config, &backend)
        .unwrap();
    assert_eq!(iterator.next().unwrap().unwrap().head().id(), 4);
    assert!(iterator.next().is_none());

    iterator.reset();
    assert_eq!(iterator.next().unwrap().unwrap().head().id(), 4);
    assert!(iterator.next().is_none());
}
