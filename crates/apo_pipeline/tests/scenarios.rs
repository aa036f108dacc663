//! End-to-end scenarios through the public pipeline surface.

use assert_json_diff::assert_json_include;
use serde_json::{json, Value};

use apo_core::{Category, ConfidenceBand, NoiseRng};
use apo_io::validate::validate_payload;
use apo_pipeline::{
    engine_identifiers, prepare, run, run_with_rng, score_deterministic, PipelineError,
    ScoringRequest,
};

fn request(doc: &Value) -> ScoringRequest {
    ScoringRequest::new(validate_payload(doc).expect("valid payload"))
}

fn routine_task(confidence: f64) -> Value {
    json!({
        "category": "tasks",
        "description": "Key invoices into the ledger",
        "factors": ["routine"],
        "confidence": confidence,
        "metadata": { "importance": 0.9, "frequency": "high", "skill_level": 1, "tech_adoption": 0.9 }
    })
}

/// Task item whose score is `70 + 20·(adoption − 0.65)`.
fn task_scoring(adoption: f64) -> Value {
    json!({
        "category": "tasks",
        "description": "Schedule appointments",
        "metadata": { "importance": 1.0, "frequency": "medium", "skill_level": 3, "tech_adoption": adoption }
    })
}

#[test]
fn three_routine_tasks_score_thirty_five() {
    let doc = json!({ "items": [routine_task(0.9), routine_task(0.9), routine_task(0.9)] });
    let out = run(request(&doc), &engine_identifiers()).unwrap();
    let r = &out.result;

    assert_eq!(r.category_breakdown.tasks.apo, 100.0);
    assert_eq!(r.category_breakdown.tasks.confidence, ConfidenceBand::High);
    for c in [Category::Knowledge, Category::Skills, Category::Abilities, Category::Technologies] {
        assert_eq!(r.category_breakdown.get(c).apo, 0.0);
        assert_eq!(r.category_breakdown.get(c).item_count, 0);
    }
    for item in &r.items_by_category.tasks {
        assert!((item.base - 93.0).abs() < 1e-9);
        assert_eq!(item.apo, 100.0);
    }
    assert!(!r.tech_heavy_applied);
    assert_eq!(r.overall_apo, 35.0);
    assert_eq!(r.base_apo, 35.0);
    assert_eq!(r.overall_confidence, ConfidenceBand::Medium);
    assert!(r.validation_warnings.is_empty());
}

#[test]
fn default_confidence_keeps_category_medium() {
    let mut item = routine_task(0.9);
    item.as_object_mut().unwrap().remove("confidence");
    let doc = json!({ "items": [item] });
    let out = run(request(&doc), &engine_identifiers()).unwrap();
    assert_eq!(out.result.category_breakdown.tasks.confidence, ConfidenceBand::Medium);
}

#[test]
fn full_run_is_reproducible() {
    let doc = json!({
        "items": [
            routine_task(0.7),
            { "category": "technologies", "description": "ERP suite", "metadata": { "tech_adoption": 0.8 } },
            { "category": "skills", "description": "Negotiation", "factors": ["social", "judgment"] }
        ],
        "external_signals": { "bls_trend_pct": 6.5, "industry_sector": "Finance" }
    });
    let a = run(request(&doc), &engine_identifiers()).unwrap();
    let b = run(request(&doc), &engine_identifiers()).unwrap();
    assert_eq!(a.result, b.result);
    assert_eq!(a.run_record, b.run_record);
    assert_eq!(a.result.overall_apo.to_bits(), b.result.overall_apo.to_bits());
    assert!(a.result.tech_heavy_applied);
    assert_eq!(a.result.external_signals.bls_adjustment_pts, Some(-3.0));
    assert!(a.run_record.result_id.starts_with("RES:"));
    assert_eq!(a.run_record.iterations, Some(200));
}

#[test]
fn weights_used_sum_to_one_with_and_without_tech_rule() {
    for adoption in [0.1, 0.95] {
        let doc = json!({ "items": [
            { "category": "technologies", "description": "CRM", "metadata": { "tech_adoption": adoption } }
        ]});
        let out = run(request(&doc), &engine_identifiers()).unwrap();
        assert!((out.result.weights_used.sum() - 1.0).abs() <= 1e-6);
        assert_eq!(out.result.tech_heavy_applied, adoption >= 0.6);
    }
}

#[test]
fn economic_discount_boundary_end_to_end() {
    let at = json!({
        "items": [task_scoring(0.65)],
        "external_signals": { "avg_implementation_cost": 150000, "annual_wage": 50000 }
    });
    let over = json!({
        "items": [task_scoring(0.65)],
        "external_signals": { "avg_implementation_cost": 150001, "annual_wage": 50000 }
    });
    let a = score_deterministic(&prepare(request(&at)).unwrap()).unwrap();
    let b = score_deterministic(&prepare(request(&over)).unwrap()).unwrap();
    assert_eq!(a.external_signals.econ_viability_discount, Some(0.0));
    assert_eq!(b.external_signals.econ_viability_discount, Some(10.0));
    assert!((a.overall_apo - b.overall_apo - 10.0).abs() < 1e-9);
}

#[test]
fn consistency_warning_names_category_and_values() {
    let warn = json!({ "items": [task_scoring(0.65)], "category_apos": { "tasks": { "apo": 80 } } });
    let d = score_deterministic(&prepare(request(&warn)).unwrap()).unwrap();
    assert!((d.category_breakdown.tasks.apo - 70.0).abs() < 1e-9);
    assert_eq!(d.warnings.len(), 1);
    assert!(d.warnings[0].contains("tasks"));
    assert!(d.warnings[0].contains("80"));
    assert!(d.warnings[0].contains("70"));

    let quiet = json!({ "items": [task_scoring(0.95)], "category_apos": { "tasks": 80 } });
    let d = score_deterministic(&prepare(request(&quiet)).unwrap()).unwrap();
    assert!(d.warnings.is_empty());
}

#[test]
fn ci_brackets_point_estimate_across_seeds() {
    let doc = json!({
        "items": [
            task_scoring(0.3),
            { "category": "skills", "description": "Data entry", "factors": ["data_driven"] },
            { "category": "knowledge", "description": "Bookkeeping rules", "confidence": 0.9 }
        ],
        "external_signals": { "bls_trend_pct": -4 },
        "config": { "simulation": { "signal_sigma": 0.0 } },
        "monte_carlo": { "iterations": 2000 }
    });
    let prepared = prepare(request(&doc)).unwrap();
    let mut inside = 0;
    for seed in 0..100u64 {
        let r = run_with_rng(&prepared, &mut NoiseRng::from_seed_u64(seed)).unwrap();
        let ci = r.ci.expect("simulation enabled");
        assert_eq!(ci.iterations, 2000);
        if ci.lower <= r.overall_apo && r.overall_apo <= ci.upper {
            inside += 1;
        }
    }
    assert!(inside >= 99, "{inside}/100");
}

#[test]
fn disabled_simulation_omits_ci_and_seed() {
    let doc = json!({ "items": [task_scoring(0.5)], "monte_carlo": { "enabled": false } });
    let out = run(request(&doc), &engine_identifiers()).unwrap();
    assert!(out.result.ci.is_none());
    assert!(out.run_record.seed.is_none());
    let v = serde_json::to_value(&out.result).unwrap();
    assert!(v.get("ci").is_none());
}

#[test]
fn result_document_shape() {
    let doc = json!({
        "items": [{
            "category": "abilities", "description": "Finger dexterity",
            "explanation": "Fine motor work with varied objects",
            "factors": ["physical_complex"]
        }],
        "timeline_projections": { "immediate": 5, "short_term": 10, "medium_term": 25, "long_term": 60 },
        "external_signals": { "industry_sector": "Healthcare", "sector_delay_months": 12 }
    });
    let out = run(request(&doc), &engine_identifiers()).unwrap();
    let v = serde_json::to_value(&out.result).unwrap();
    assert_json_include!(
        actual: v.clone(),
        expected: json!({
            "timeline": "long_term",
            "external_signals": { "industry_sector": "Healthcare", "sector_delay_months": 12.0 },
            "items_by_category": { "abilities": [{
                "description": "Finger dexterity",
                "explanation": "Fine motor work with varied objects",
                "factors": ["physical_complex"]
            }]},
            "validation_warnings": []
        })
    );
    for key in ["tasks", "knowledge", "skills", "abilities", "technologies"] {
        assert!(v["category_breakdown"].get(key).is_some(), "{key}");
        assert!(v["weights_used"].get(key).is_some(), "{key}");
        assert!(v["items_by_category"].get(key).is_some(), "{key}");
    }
    assert!(v["external_signals"].get("bls_adjustment_pts").is_none());
}

#[test]
fn invalid_payload_is_refused_before_scoring() {
    let doc = json!({ "items": [{ "category": "tasks", "description": "x", "metadata": { "frequency": "hourly" } }] });
    let err = validate_payload(&doc).unwrap_err();
    assert_eq!(err.pointer, "/items/0/metadata/frequency");
    let as_pipeline: PipelineError = err.into();
    assert!(matches!(as_pipeline, PipelineError::Validation(_)));
    assert!(as_pipeline.to_string().starts_with("validation failed at /items/0/metadata/frequency"));
}

#[test]
fn malformed_config_degrades_with_warning() {
    let doc = json!({
        "items": [task_scoring(0.65)],
        "config": { "weights": { "tasks": "heavy" } }
    });
    let out = run(request(&doc), &engine_identifiers()).unwrap();
    assert_eq!(out.result.weights_used, apo_core::weights::WeightSet::DEFAULT);
    assert_eq!(out.result.validation_warnings.len(), 1);
    assert!(out.result.validation_warnings[0].starts_with("config: weights"));
}

#[test]
fn key_factors_become_insights() {
    let doc = json!({
        "items": [task_scoring(0.65)],
        "key_factors": {
            "bottlenecks": ["manual approvals"],
            "gen_ai_impacts": ["document extraction"],
            "adaptation_strategies": ["process redesign"]
        },
        "recommendations": ["adopt OCR"]
    });
    let out = run(request(&doc), &engine_identifiers()).unwrap();
    assert_json_include!(
        actual: serde_json::to_value(&out.result).unwrap(),
        expected: json!({
            "insights": {
                "primary_opportunities": ["document extraction"],
                "main_challenges": ["manual approvals"],
                "automation_drivers": ["document extraction"],
                "barriers": ["manual approvals"]
            },
            "recommendations": ["adopt OCR"]
        })
    );

    // Absent key factors still yield an insights block with empty lists.
    let bare = run(request(&json!({ "items": [task_scoring(0.65)] })), &engine_identifiers()).unwrap();
    assert_eq!(bare.result.insights, apo_pipeline::Insights::default());
    assert!(bare.result.recommendations.is_empty());
    // Without key factors the digest matches a payload that never mentioned them.
    let empty = run(
        request(&json!({ "items": [task_scoring(0.65)], "key_factors": {}, "recommendations": [] })),
        &engine_identifiers(),
    )
    .unwrap();
    assert_eq!(bare.run_record.input_sha256, empty.run_record.input_sha256);
}
