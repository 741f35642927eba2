// Integration tests for tasador
use std::sync::Arc;
use tasador_core::{normalize_text, reconstruct, Error, Row, Table, TableRole};
use tasador_matching::{
    AssignedPrice, EmbedderHandle, EmbedderKind, MatchConfig, MatchSource, PricingEngine, PricingReport, Strategy,
    NOT_FOUND,
};

fn engine() -> PricingEngine {
    PricingEngine::new(Arc::new(EmbedderHandle::for_kind(EmbedderKind::Hashing, 384)))
}

fn reference() -> Table {
    Table::with_rows(
        TableRole::Reference,
        vec![
            Row::priced("P01", "Excavación", 120.0),
            Row::description("en terreno suelto"),
            Row::priced("P02", "Muro de bloque", 45.0),
            Row::description("de hormigón 40x20x20"),
            Row::priced("P03", "Solado de baldosa cerámica", 32.5),
            Row::description("recibido con mortero de cemento"),
        ],
    )
}

fn query(texts: &[&str]) -> Table {
    Table::with_rows(
        TableRole::Query,
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| Row::item(&format!("N{:02}", i + 1), text))
            .collect(),
    )
}

fn prices(report: &PricingReport) -> Vec<AssignedPrice> {
    report.items.iter().map(|i| i.assigned_price).collect()
}

#[test]
fn test_two_row_item_is_rebuilt() {
    let table = Table::with_rows(
        TableRole::Reference,
        vec![
            Row::priced("P01", "Excavación", 120.0),
            Row::description("en terreno suelto"),
        ],
    );
    let rec = reconstruct(&table);
    assert_eq!(rec.items.len(), 1);
    assert_eq!(rec.items[0].code, "P01");
    assert_eq!(rec.items[0].raw_text, "Excavación en terreno suelto");
    assert_eq!(rec.items[0].normalized_text, "excavacion en terreno suelto");
    assert_eq!(rec.items[0].price, Some(120.0));
}

#[test]
fn test_unaccented_query_takes_reference_price() {
    let report = engine()
        .run(
            &reference(),
            &query(&["Excavacion en terreno suelto"]),
            &MatchConfig::new(Strategy::Lexical).with_threshold(80.0),
        )
        .unwrap();

    let item = &report.items[0];
    assert_eq!(item.assigned_price, AssignedPrice::Price(120.0));
    assert_eq!(item.matched_code.as_deref(), Some("P01"));
    assert_eq!(item.source, MatchSource::Similarity);
    assert!(item.score >= 80.0);
}

#[test]
fn test_unrelated_query_is_not_found_lexical() {
    let report = engine()
        .run(
            &reference(),
            &query(&["Instalación de ascensor panorámico"]),
            &MatchConfig::new(Strategy::Lexical).with_threshold(80.0),
        )
        .unwrap();
    assert_eq!(report.items[0].assigned_price, AssignedPrice::NotFound);
    assert!(report.items[0].matched_text.is_none());
}

#[test]
fn test_unrelated_query_is_not_found_semantic() {
    let report = engine()
        .run(
            &reference(),
            &query(&["Instalación de ascensor panorámico"]),
            &MatchConfig::new(Strategy::Semantic).with_threshold(0.7),
        )
        .unwrap();
    assert_eq!(report.items[0].assigned_price, AssignedPrice::NotFound);
    assert_eq!(report.to_json_pretty().unwrap().matches(NOT_FOUND).count(), 1);
}

#[test]
fn test_semantic_identical_text_matches() {
    let report = engine()
        .run(
            &reference(),
            &query(&["Muro de bloque de hormigon 40x20x20"]),
            &MatchConfig::new(Strategy::Semantic),
        )
        .unwrap();
    assert_eq!(report.items[0].assigned_price, AssignedPrice::Price(45.0));
    assert!((report.items[0].score - 1.0).abs() < 1e-4);
}

#[test]
fn test_duplicate_reference_text_takes_first() {
    let reference = Table::with_rows(
        TableRole::Reference,
        vec![
            Row::priced("A1", "Pintura plástica", 7.0),
            Row::priced("A2", "PINTURA PLASTICA", 9.0),
        ],
    );
    for config in [MatchConfig::new(Strategy::Lexical), MatchConfig::new(Strategy::Semantic)] {
        let report = engine().run(&reference, &query(&["pintura plastica"]), &config).unwrap();
        assert_eq!(report.items[0].assigned_price, AssignedPrice::Price(7.0));
        assert_eq!(report.items[0].matched_code.as_deref(), Some("A1"));
    }
}

#[test]
fn test_empty_reference_set_aborts() {
    // rows without a price never enter the reference set
    let reference = Table::with_rows(
        TableRole::Reference,
        vec![Row::item("P01", "Excavación"), Row::description("en terreno suelto")],
    );
    for strategy in [Strategy::Lexical, Strategy::Semantic] {
        let err = engine()
            .run(&reference, &query(&["Excavación"]), &MatchConfig::new(strategy))
            .unwrap_err();
        assert!(matches!(err, Error::EmptyReferenceSet));
        assert!(err.is_configuration());
    }
}

#[test]
fn test_normalization_is_idempotent() {
    for text in [
        "Excavación en terreno suelto",
        "  MURO  de bloque, 40x20x20!  ",
        "Ñandú — pingüino",
        "",
        "m²  de   muro",
    ] {
        let once = normalize_text(text);
        assert_eq!(normalize_text(&once), once);
    }
}

#[test]
fn test_raising_threshold_never_adds_matches() {
    let texts = [
        "Excavacion en terreno suelto",
        "Excavación en terreno",
        "Muro de bloque",
        "Solado de baldosa",
        "Instalación de ascensor panorámico",
    ];
    let q = query(&texts);

    for (strategy, thresholds) in [
        (Strategy::Lexical, vec![0.0, 40.0, 60.0, 80.0, 95.0, 100.0]),
        (Strategy::Semantic, vec![-1.0, 0.0, 0.3, 0.5, 0.7, 0.9, 1.0]),
    ] {
        let mut previous: Option<Vec<bool>> = None;
        for threshold in thresholds {
            let report = engine()
                .run(&reference(), &q, &MatchConfig::new(strategy).with_threshold(threshold))
                .unwrap();
            let found: Vec<bool> = report.items.iter().map(|i| i.assigned_price.is_found()).collect();
            if let Some(prev) = &previous {
                for (before, now) in prev.iter().zip(&found) {
                    assert!(!now || *before, "{strategy} threshold {threshold} added a match");
                }
            }
            previous = Some(found);
        }
    }
}

#[test]
fn test_runs_are_deterministic() {
    let q = query(&[
        "Excavacion en terreno suelto",
        "Muro de bloque",
        "Instalación de ascensor panorámico",
    ]);
    for strategy in [Strategy::Lexical, Strategy::Semantic] {
        let config = MatchConfig::new(strategy);
        let first = engine().run(&reference(), &q, &config).unwrap();
        let second = engine().run(&reference(), &q, &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(prices(&first), prices(&second));
    }
}

#[test]
fn test_output_keeps_query_order() {
    let q = query(&["Solado de baldosa cerámica", "Excavación en terreno suelto", "Muro de bloque"]);
    let report = engine().run(&reference(), &q, &MatchConfig::default()).unwrap();
    let codes: Vec<&str> = report.items.iter().map(|i| i.code.as_str()).collect();
    assert_eq!(codes, vec!["N01", "N02", "N03"]);
}

#[test]
fn test_exact_code_match_prefers_code() {
    let q = Table::with_rows(TableRole::Query, vec![Row::item("P02", "Tabique de pladur")]);

    let by_text = engine().run(&reference(), &q, &MatchConfig::default()).unwrap();
    assert_eq!(by_text.items[0].assigned_price, AssignedPrice::NotFound);

    let by_code = engine()
        .run(&reference(), &q, &MatchConfig::default().with_exact_code_match(true))
        .unwrap();
    assert_eq!(by_code.items[0].assigned_price, AssignedPrice::Price(45.0));
    assert_eq!(by_code.items[0].source, MatchSource::Code);
    assert_eq!(by_code.stats.code_matches, 1);
}

#[test]
fn test_report_json_shape() {
    let report = engine()
        .run(
            &reference(),
            &query(&["Excavacion en terreno suelto", "Ascensor"]),
            &MatchConfig::default(),
        )
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["strategy"], "lexical");
    assert_eq!(json["items"][0]["assigned_price"], 120.0);
    assert_eq!(json["items"][1]["assigned_price"], "not found");
    assert_eq!(json["stats"]["query_items"], 2);
}
