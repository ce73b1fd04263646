use factcheck::{
    CanonicalAnswer, CheckReport, FactCheckConfig, FactChecker, HeuristicAnnotator,
    InMemoryKnowledgeBase, MatchPolicy, ScriptedCompletion, UnverifiableReason, Verdict,
};
use std::sync::Arc;

fn world() -> Arc<InMemoryKnowledgeBase> {
    Arc::new(
        InMemoryKnowledgeBase::new()
            .with_entity("Q142", "France", &["French Republic"])
            .with_entity("Q183", "Germany", &["Federal Republic of Germany"])
            .with_entity("Q90", "Paris", &[])
            .with_entity("Q64", "Berlin", &[])
            .with_entity("Q1490", "Tokyo", &[])
            .with_facts("Q142", "P36", &["Paris"])
            .with_facts("Q142", "P6", &["Emmanuel Macron", "Gabriel Attal"])
            .with_facts("Q183", "P36", &["Berlin"])
            .with_facts("Q183", "P6", &["Olaf Scholz"])
            .with_facts("Q1490", "P1082", &["14094034"]),
    )
}

fn checker_with(config: FactCheckConfig, kb: Arc<InMemoryKnowledgeBase>) -> FactChecker {
    FactChecker::new(config, Arc::new(HeuristicAnnotator::new()), kb).unwrap()
}

fn checker() -> (FactChecker, Arc<InMemoryKnowledgeBase>) {
    let kb = world();
    (checker_with(FactCheckConfig::default(), kb.clone()), kb)
}

#[test]
fn entity_answer_matches() {
    let (checker, _) = checker();
    let report = checker.check_answer("What is the capital of France?", "It is called Paris");
    assert_eq!(report.verdict, Verdict::Match);
    assert_eq!(report.canonical, Some(CanonicalAnswer::Entity("Paris".to_string())));

    let subject = report.subject_entity.as_ref().unwrap();
    assert_eq!(subject.id.as_str(), "Q142");
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["subject_entity"]["id"], "Q142");
    assert_eq!(json["subject_entity"]["label"], "France");
}

#[test]
fn false_statement_is_no_match() {
    let (checker, _) = checker();
    let report = checker.check_statement("The capital of France is Berlin");
    assert_eq!(report.verdict, Verdict::NoMatch);
    assert_eq!(report.claim.object.as_deref(), Some("Berlin"));

    let report = checker.check_statement("The capital of France is Paris");
    assert_eq!(report.verdict, Verdict::Match);
}

#[test]
fn negative_answer_to_existing_fact() {
    let (checker, _) = checker();
    let report = checker.check_answer("Does Germany have a leader?", "I don't think it does, Nope");
    assert_eq!(report.canonical, Some(CanonicalAnswer::Negative));
    assert_eq!(report.claim.subject.as_deref(), Some("Germany"));
    assert_eq!(report.claim.relation.as_deref(), Some("leader"));
    assert_eq!(report.verdict, Verdict::NoMatch);

    let report = checker.check_answer("Does Germany have a leader?", "Sure it does");
    assert_eq!(report.verdict, Verdict::Match);
}

#[test]
fn resolver_failure_skips_fact_lookup() {
    let (checker, kb) = checker();
    kb.fail_searches(true);
    let report = checker.check_answer("What is the capital of France?", "Paris");
    assert_eq!(
        report.verdict,
        Verdict::Unverifiable(UnverifiableReason::UnknownSubject)
    );
    assert_eq!(kb.search_calls(), 1);
    assert_eq!(kb.fact_calls(), 0);
}

#[test]
fn retrieval_failure() {
    let (checker, kb) = checker();
    kb.fail_fact_queries(true);
    let report = checker.check_answer("What is the capital of France?", "Paris");
    assert_eq!(
        report.verdict,
        Verdict::Unverifiable(UnverifiableReason::RetrievalFailed)
    );
}

#[test]
fn copula_led_question_is_reversed() {
    let (checker, _) = checker();
    let report = checker.check_answer("Is Berlin the capital of Germany", "yes");
    assert_eq!(report.claim.subject.as_deref(), Some("Germany"));
    assert_eq!(report.claim.object.as_deref(), Some("Berlin"));
    assert_eq!(report.verdict, Verdict::Match);

    // Existence implies yes: France has a capital, so "yes" matches even
    // though Berlin is not it. The statement path compares the object.
    let report = checker.check_answer("Is Berlin the capital of France", "yes");
    assert_eq!(report.verdict, Verdict::Match);
    let report = checker.check_statement("Is Berlin the capital of France");
    assert_eq!(report.verdict, Verdict::NoMatch);
    assert_eq!(
        report.subject_entity.map(|e| e.id.as_str().to_string()),
        Some("Q142".to_string())
    );

    let report = checker.check_statement("(Is Berlin the capital of France)");
    assert_eq!(report.claim.subject.as_deref(), Some("France"));
    assert_eq!(report.verdict, Verdict::NoMatch);
}

#[test]
fn unknown_relation_is_unparseable() {
    let (checker, kb) = checker();
    let report = checker.check_answer("Who is the mayor of Paris?", "Anne Hidalgo");
    assert_eq!(
        report.verdict,
        Verdict::Unverifiable(UnverifiableReason::UnparseableClaim)
    );
    assert_eq!(kb.search_calls(), 0);
}

#[test]
fn leader_with_several_values() {
    let (checker, _) = checker();
    let question = "Who is the leader of France?";
    assert_eq!(
        checker.check_answer(question, "It is Gabriel Attal").verdict,
        Verdict::Match
    );
    assert_eq!(
        checker.check_answer(question, "It is Angela Merkel").verdict,
        Verdict::NoMatch
    );
}

#[test]
fn fact_cap_applies() {
    let config = FactCheckConfig::default().with_max_facts(1);
    let checker = checker_with(config, world());
    assert_eq!(
        checker
            .check_answer("Who is the leader of France?", "It is Gabriel Attal")
            .verdict,
        Verdict::NoMatch
    );
}

#[test]
fn numeric_values_compare_as_labels() {
    let (checker, _) = checker();
    let report = checker.check_answer("What is the population of Tokyo?", "14094034");
    assert_eq!(report.verdict, Verdict::Match);
}

#[test]
fn fuzzy_threshold_from_config() {
    let question = "What is the capital of France?";

    let lenient = checker_with(FactCheckConfig::default(), world());
    assert_eq!(lenient.check_answer(question, "Pari").verdict, Verdict::Match);

    let strict = checker_with(
        FactCheckConfig::default().with_match_policy(MatchPolicy::fuzzy(0.95)),
        world(),
    );
    assert_eq!(strict.check_answer(question, "Pari").verdict, Verdict::NoMatch);

    let exact = checker_with(
        FactCheckConfig::from_json_str(r#"{"match_policy": {"mode": "exact"}}"#).unwrap(),
        world(),
    );
    assert_eq!(exact.check_answer(question, "paris").verdict, Verdict::NoMatch);
    assert_eq!(exact.check_answer(question, "Paris").verdict, Verdict::Match);
}

#[test]
fn negation_aware_answers() {
    let checker = checker_with(FactCheckConfig::default().with_negation_aware(true), world());
    let question = "What is the capital of Germany?";

    let report = checker.check_answer(question, "Berlin, not Munich");
    assert_eq!(report.verdict, Verdict::Match);
    assert_eq!(report.rejected, vec!["Munich".to_string()]);

    assert_eq!(checker.check_answer(question, "Not Berlin").verdict, Verdict::NoMatch);
    assert_eq!(checker.check_answer(question, "Not Bonn").verdict, Verdict::Match);
}

#[test]
fn rejection_phrasings_agree() {
    let checker = checker_with(FactCheckConfig::default().with_negation_aware(true), world());
    let question = "What is the capital of France?";

    for rejects_wrong in [
        "Not Berlin",
        "It's not Berlin",
        "Definitely not Berlin",
        "The capital is not Berlin",
        "No, not Berlin",
    ] {
        let report = checker.check_answer(question, rejects_wrong);
        assert_eq!(report.verdict, Verdict::Match, "{rejects_wrong}");
        assert_eq!(report.canonical, Some(CanonicalAnswer::Negative), "{rejects_wrong}");
    }

    for rejects_truth in ["Not Paris", "It's not Paris", "No, not Paris"] {
        let report = checker.check_answer(question, rejects_truth);
        assert_eq!(report.verdict, Verdict::NoMatch, "{rejects_truth}");
    }
}

#[test]
fn ask_model() {
    let (checker, _) = checker();
    let completion = ScriptedCompletion::new(["Berlin\nQ: What is the capital of Italy?", "Bonn"]);

    let report = checker.ask("What is the capital of Germany?", &completion);
    assert_eq!(report.verdict, Verdict::Match);
    assert_eq!(report.answer.as_deref(), Some("Berlin"));

    let report = checker.ask("What is the capital of Germany?", &completion);
    assert_eq!(report.verdict, Verdict::NoMatch);

    let report = checker.ask("What is the capital of Germany?", &completion);
    assert_eq!(
        report.verdict,
        Verdict::Unverifiable(UnverifiableReason::CompletionFailed)
    );

    let prompts: Vec<String> = completion.requests().into_iter().map(|r| r.prompt).collect();
    assert_eq!(prompts.len(), 3);
    assert!(prompts.iter().all(|p| p == "What is the capital of Germany?"));
}

#[test]
fn checks_run_in_parallel() {
    let (checker, kb) = checker();
    let checker = Arc::new(checker);

    let reports: Vec<CheckReport> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let checker = Arc::clone(&checker);
                scope.spawn(move || {
                    if i % 2 == 0 {
                        checker.check_answer("What is the capital of France?", "Paris")
                    } else {
                        checker.check_statement("The capital of Germany is Bonn")
                    }
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (i, report) in reports.iter().enumerate() {
        let expected = if i % 2 == 0 { Verdict::Match } else { Verdict::NoMatch };
        assert_eq!(report.verdict, expected);
    }
    let mut ids: Vec<_> = reports.iter().map(|r| r.id).collect();
    ids.sort_by_key(|id| *id.as_uuid());
    ids.dedup();
    assert_eq!(ids.len(), 8);
    assert_eq!(kb.search_calls(), 8);
    assert_eq!(kb.fact_calls(), 8);
}
