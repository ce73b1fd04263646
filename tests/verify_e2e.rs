use factcheck::{
    Annotation, Annotator, CanonicalAnswer, Claim, DependencyRole, EntityId, EntityLabel,
    EntityResolver, EntitySpan, FactCheckConfig, FactChecker, FactQuery, FactRetriever, FactSet,
    HeuristicAnnotator, KnowledgeBase, KnowledgeEntity, Relation, RelationRegistry, Token,
    TransportError, UnverifiableReason, Verdict, VerdictEngine,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Knowledge base that knows one entity and counts the languages it was asked for.
#[derive(Default)]
struct SingleEntityKb {
    fact_calls: AtomicUsize,
    last_language: std::sync::Mutex<Option<String>>,
}

impl KnowledgeBase for SingleEntityKb {
    fn search_entities(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<KnowledgeEntity>, TransportError> {
        assert_eq!(limit, 1);
        if name.eq_ignore_ascii_case("italy") {
            Ok(vec![KnowledgeEntity::new(EntityId::new("Q38"), "Italy")])
        } else {
            Ok(Vec::new())
        }
    }

    fn query_facts(&self, query: &FactQuery) -> Result<FactSet, TransportError> {
        self.fact_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_language.lock().unwrap() = Some(query.language.clone());
        match (query.entity_id.as_str(), query.property_id.as_str()) {
            ("Q38", "P36") => Ok(FactSet::from(vec!["Rome".to_string()])),
            ("Q38", "P1376") => Err(TransportError::Timeout { duration_ms: 10 }),
            _ => Ok(FactSet::empty()),
        }
    }
}

fn engine(kb: Arc<SingleEntityKb>, registry: RelationRegistry) -> VerdictEngine {
    VerdictEngine::new(
        Arc::new(registry),
        EntityResolver::new(kb.clone()),
        FactRetriever::new(kb),
    )
}

#[test]
fn unsupported_relation_short_circuits() {
    let kb = Arc::new(SingleEntityKb::default());
    let engine = engine(kb.clone(), RelationRegistry::default());
    let verdict = engine.verify(
        &Claim::triple("Italy", "mayor", "Rome"),
        &CanonicalAnswer::Entity("Rome".to_string()),
    );
    assert_eq!(
        verdict,
        Verdict::Unverifiable(UnverifiableReason::UnsupportedRelation)
    );
    assert_eq!(kb.fact_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn custom_knowledge_base_behind_trait() {
    let kb = Arc::new(SingleEntityKb::default());
    let engine = engine(kb.clone(), RelationRegistry::default());
    let claim = Claim::new(Some("Italy"), Some("capital"), None::<String>);

    assert_eq!(
        engine.verify(&claim, &CanonicalAnswer::Entity("Rome".to_string())),
        Verdict::Match
    );
    assert_eq!(
        engine.verify(&claim, &CanonicalAnswer::Entity("Milan".to_string())),
        Verdict::NoMatch
    );
    assert_eq!(
        kb.last_language.lock().unwrap().as_deref(),
        Some("[AUTO_LANGUAGE]")
    );
}

#[test]
fn empty_fact_set_answers_no() {
    let kb = Arc::new(SingleEntityKb::default());
    let engine = engine(kb, RelationRegistry::default());
    let claim = Claim::new(Some("Italy"), Some("deathdate"), None::<String>);
    assert_eq!(engine.verify(&claim, &CanonicalAnswer::Negative), Verdict::Match);
    assert_eq!(engine.verify(&claim, &CanonicalAnswer::Affirmative), Verdict::NoMatch);
}

#[test]
fn custom_relation_table() {
    let registry =
        RelationRegistry::new([Relation::new("seat", "P36"), Relation::new("hub", "P1376")])
            .unwrap();
    let kb = Arc::new(SingleEntityKb::default());
    let engine = engine(kb, registry);

    let seat = Claim::triple("Italy", "seat", "Rome");
    assert_eq!(engine.verify_statement(&seat), Verdict::Match);

    let capital = Claim::triple("Italy", "capital", "Rome");
    assert_eq!(
        engine.verify_statement(&capital),
        Verdict::Unverifiable(UnverifiableReason::UnsupportedRelation)
    );

    let hub = Claim::triple("Italy", "hub", "Rome");
    assert_eq!(
        engine.verify_statement(&hub),
        Verdict::Unverifiable(UnverifiableReason::RetrievalFailed)
    );
}

#[test]
fn checker_with_json_config() {
    let config = FactCheckConfig::from_json_str(
        r#"{
            "relations": [{"keyword": "seat", "property_id": "P36"}],
            "language": "it"
        }"#,
    )
    .unwrap();
    let kb = Arc::new(SingleEntityKb::default());
    let checker = FactChecker::new(config, Arc::new(HeuristicAnnotator::new()), kb.clone()).unwrap();

    let report = checker.check_statement("The seat of Italy is Rome");
    assert_eq!(report.verdict, Verdict::Match);
    assert_eq!(kb.last_language.lock().unwrap().as_deref(), Some("it"));

    let report = checker.check_statement("The capital of Italy is Rome");
    assert_eq!(
        report.verdict,
        Verdict::Unverifiable(UnverifiableReason::UnparseableClaim)
    );
}

/// Annotator standing in for a statistical NLP model.
struct ModelAnnotator;

impl Annotator for ModelAnnotator {
    fn annotate(&self, text: &str) -> Annotation {
        if text.contains("Italia") {
            Annotation {
                entities: vec![EntitySpan::new("Italia", EntityLabel::Location)],
                tokens: vec![
                    Token::new("capitals", "capital", DependencyRole::Subject),
                    Token::new("Rome", "rome", DependencyRole::Attribute),
                ],
            }
        } else {
            Annotation::default()
        }
    }
}

#[test]
fn checker_accepts_any_annotator() {
    let kb = Arc::new(SingleEntityKb::default());
    let checker =
        FactChecker::new(FactCheckConfig::default(), Arc::new(ModelAnnotator), kb).unwrap();

    let report = checker.check_statement("capitals of Italia: Rome");
    assert_eq!(report.claim, Claim::triple("Italia", "capital", "Rome"));
    // "Italia" is not a known label in this knowledge base.
    assert_eq!(
        report.verdict,
        Verdict::Unverifiable(UnverifiableReason::UnknownSubject)
    );
}
