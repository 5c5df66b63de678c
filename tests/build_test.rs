//! End-to-end build over CSV fixtures written to a temp directory.

use std::fs;
use std::path::Path;

use aipi::app::pipeline::{build_meta, run_build, write_artifacts};
use aipi::domain::{BuildConfig, Policy};
use aipi::error::{EXIT_EMPTY, EXIT_INPUT};

const RECORDS_HEADER: &str = "provider_id,provider_name,system_family,indicator_id,indicator_value,\
evidence_url,evidence_excerpt,coder_email_or_id,date_coded_utc,last_reviewed_utc";

const PROVIDERS_HEADER: &str = "provider_id,provider_name,entity_type,hq_country,provider_website,\
system_family,license_or_terms,open_weights,model_family_source_url,notes,last_verified_utc";

const CODEBOOK: &str = "\
indicator_id,pillar,subpillar,indicator_name,definition,operationalization,allowed_values,evidence_required,coding_instructions,version,last_updated_utc
ACC1,Accountability,Audit,External audit,,,Yes|No|Unknown,,,0.1,2025-01-01
GOV1,Participatory governance,,Public input,,,Yes|No|Unknown,,,0.1,2025-01-01
TRA1,Transparency,,Model card depth,,,0|1|2|Unknown,,,0.1,2025-01-01
";

fn write_inputs(root: &Path, records: &[&str], providers: &[&str]) {
    let data = root.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("ai_codebook.csv"), CODEBOOK).unwrap();

    let mut text = format!("{RECORDS_HEADER}\n");
    for r in records {
        text.push_str(r);
        text.push('\n');
    }
    fs::write(data.join("ai_records.csv"), text).unwrap();

    let mut text = format!("{PROVIDERS_HEADER}\n");
    for p in providers {
        text.push_str(p);
        text.push('\n');
    }
    fs::write(data.join("ai_providers_and_families.csv"), text).unwrap();
}

fn config(root: &Path) -> BuildConfig {
    BuildConfig {
        root: root.to_path_buf(),
        build_dir: root.join("build"),
        top_n: 10,
    }
}

fn sample_inputs(root: &Path) {
    write_inputs(
        root,
        &[
            "acme,Acme,Acme-1,ACC1,Yes,https://a.example,\"audit, 2024\",c1,2025-01-01,",
            "acme,Acme,Acme-1,GOV1,No,,,c1,2025-01-01,",
            "acme,Acme,Acme-1,TRA1,Unknown,,,c1,2025-01-01,",
            "beta,Beta Labs,Beta-X,ACC1,Unknown,,,c2,2025-01-02,",
            "beta,Beta Labs,Beta-X,GOV1,Yes,,,c2,2025-01-02,",
            "beta,Beta Labs,Beta-X,TRA1,2,,,c2,2025-01-02,",
        ],
        &[
            "acme,Acme,lab,US,https://acme.example,Acme-1,proprietary,No,,,2025-01-01",
            "beta,Beta Labs,lab,FR,https://beta.example,Beta-X,apache-2.0,Yes,,,2025-01-01",
        ],
    );
}

#[test]
fn yes_no_unknown_system_scores_as_documented() {
    let dir = tempfile::tempdir().unwrap();
    sample_inputs(dir.path());

    let run = run_build(&config(dir.path())).unwrap();
    let evidence = run.build.systems(Policy::Evidence);
    let known = run.build.systems(Policy::KnownOnly);

    let acme_e = evidence.rows.iter().find(|r| r.provider_id == "acme").unwrap();
    let acme_k = known.rows.iter().find(|r| r.provider_id == "acme").unwrap();
    assert!((acme_e.aipi - 1.0 / 3.0).abs() < 1e-12);
    assert!((acme_k.aipi - 0.5).abs() < 1e-12);
    assert!((acme_e.coverage - 2.0 / 3.0).abs() < 1e-12);

    // Beta: ACC unknown, GOV 1, TRA 1 -> evidence 2/3 beats Acme.
    assert_eq!(evidence.rows[0].provider_id, "beta");
    assert_eq!(evidence.rows[0].rank, 1);
    assert_eq!(evidence.rows[1].rank, 2);
}

#[test]
fn writes_every_artifact_and_is_byte_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    sample_inputs(dir.path());
    let cfg = config(dir.path());

    let run = run_build(&cfg).unwrap();
    let meta = build_meta(&run.inputs, &run.build);
    let written = write_artifacts(&cfg.build_dir, &run.build, &meta).unwrap();
    assert_eq!(written.len(), 8);

    for name in [
        "systems_ranking_evidence.csv",
        "systems_ranking_known_only.csv",
        "providers_ranking_evidence.csv",
        "providers_ranking_known_only.csv",
        "scores_by_indicator.csv",
        "meta.json",
        "providers.json",
        "systems.json",
    ] {
        assert!(cfg.build_dir.join(name).is_file(), "missing {name}");
    }

    let first = fs::read(cfg.build_dir.join("systems_ranking_evidence.csv")).unwrap();
    let detail_first = fs::read(cfg.build_dir.join("scores_by_indicator.csv")).unwrap();

    let run = run_build(&cfg).unwrap();
    let meta = build_meta(&run.inputs, &run.build);
    write_artifacts(&cfg.build_dir, &run.build, &meta).unwrap();
    assert_eq!(first, fs::read(cfg.build_dir.join("systems_ranking_evidence.csv")).unwrap());
    assert_eq!(detail_first, fs::read(cfg.build_dir.join("scores_by_indicator.csv")).unwrap());

    let header = String::from_utf8(first).unwrap();
    assert!(header.starts_with(
        "provider_id,provider_name,system_family,Accountability,Participatory governance,Transparency,AIPI,coverage,rank"
    ));

    let meta: serde_json::Value =
        serde_json::from_slice(&fs::read(cfg.build_dir.join("meta.json")).unwrap()).unwrap();
    assert_eq!(meta["pillars"].as_array().unwrap().len(), 3);
    assert_eq!(meta["indicators"][0]["indicator_id"], "ACC1");
}

#[test]
fn missing_columns_fail_with_input_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    sample_inputs(dir.path());
    fs::write(
        dir.path().join("data/ai_codebook.csv"),
        "indicator_id,allowed_values\nACC1,Yes|No|Unknown\n",
    )
    .unwrap();

    let err = run_build(&config(dir.path())).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_INPUT);
    assert!(err.message().contains("ai_codebook.csv"));
    assert!(err.message().contains("pillar"));
}

#[test]
fn unresolved_provider_reference_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(
        dir.path(),
        &["ghost,Ghost,G-1,ACC1,Yes,,,c1,2025-01-01,"],
        &["acme,Acme,lab,US,,Acme-1,,,,,2025-01-01"],
    );

    let err = run_build(&config(dir.path())).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_INPUT);
    assert!(err.message().contains("ghost"));
}

#[test]
fn empty_records_fail_with_empty_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), &[], &["acme,Acme,lab,US,,Acme-1,,,,,2025-01-01"]);

    let err = run_build(&config(dir.path())).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_EMPTY);
}

#[test]
fn missing_data_directory_is_an_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_build(&config(dir.path())).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_INPUT);
}
