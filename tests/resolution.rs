//! End-to-end configuration resolution
//!
//! Feeds full YAML cluster manifests through the engine and asserts on the
//! rendered artifacts, the way a reconciliation loop consumes them.

use spark_config::catalog;
use spark_config::crd::{SparkClusterSpec, SparkRole};
use spark_config::{ConfigEngine, UnitRegistry, SPARK_DEFAULTS_CONF, SPARK_ENV_SH};

fn parse_spec(yaml: &str) -> SparkClusterSpec {
    let value = spark_config::yaml::parse_yaml(yaml).expect("manifest YAML should parse");
    serde_json::from_value(value).expect("manifest should deserialize")
}

fn sample_manifest() -> SparkClusterSpec {
    parse_spec(
        r#"
version: "3.0.1"
config:
  spark.authenticate.secret: "hunter22"
roles:
  master:
    roleGroups:
      default:
        replicas: 1
  worker:
    config:
      SPARK_WORKER_CORES: "4"
    roleGroups:
      default:
        replicas: 3
        config:
          SPARK_WORKER_CORES: "8"
          SPARK_WORKER_MEMORY: "16g"
      edge:
        replicas: 1
        configOverrides:
          spark-env.sh:
            SPARK_WORKER_CORES: "1"
          metrics.properties:
            "*.sink.console.period": "10"
  historyServer:
    roleGroups:
      default:
        replicas: 1
"#,
    )
}

/// Story: a manifest without port config still gets working master ports
///
/// The master role requires its port; the catalog default for 3.0.1 is
/// injected and rendered into the environment artifact.
#[test]
fn story_master_artifacts_carry_injected_defaults() {
    let units = UnitRegistry::builtin();
    let catalog = catalog::spark_defaults(&units).expect("builtin catalog loads");
    let engine = ConfigEngine::new(&catalog, &units);

    let spec = sample_manifest();
    spec.validate().expect("manifest is well formed");
    let compiled = engine.compile(&spec).expect("compiles");

    let env = compiled
        .file(SparkRole::Master, "default", SPARK_ENV_SH)
        .expect("master env artifact");
    assert!(env.contains("SPARK_MASTER_PORT=\"7077\""));
    assert!(env.contains("SPARK_NO_DAEMONIZE=\"true\""));
}

/// Story: the cluster-wide auth secret implies authentication everywhere
///
/// `spark.authenticate.secret` in the common tier expands to
/// `spark.authenticate=true` in every role group's defaults file, with the
/// explicit secret rendered before the implied flag.
#[test]
fn story_auth_secret_expands_in_every_role_group() {
    let units = UnitRegistry::builtin();
    let catalog = catalog::spark_defaults(&units).expect("builtin catalog loads");
    let engine = ConfigEngine::new(&catalog, &units);

    let compiled = engine.compile(&sample_manifest()).expect("compiles");

    let master_defaults = compiled
        .file(SparkRole::Master, "default", SPARK_DEFAULTS_CONF)
        .expect("master defaults artifact");
    assert_eq!(
        master_defaults,
        "spark.authenticate.secret=hunter22\nspark.authenticate=true\n"
    );

    for (role, group) in [
        (SparkRole::Worker, "default"),
        (SparkRole::Worker, "edge"),
        (SparkRole::HistoryServer, "default"),
    ] {
        let defaults = compiled
            .file(role, group, SPARK_DEFAULTS_CONF)
            .expect("defaults artifact");
        assert!(defaults.contains("spark.authenticate=true"), "{role}/{group}");
    }
}

/// Story: role-group config beats role config
#[test]
fn story_role_group_tier_wins_the_merge() {
    let units = UnitRegistry::builtin();
    let catalog = catalog::spark_defaults(&units).expect("builtin catalog loads");
    let engine = ConfigEngine::new(&catalog, &units);

    let compiled = engine.compile(&sample_manifest()).expect("compiles");

    let env = compiled
        .file(SparkRole::Worker, "default", SPARK_ENV_SH)
        .expect("worker env artifact");
    assert!(env.contains("SPARK_WORKER_CORES=\"8\""), "group tier wins");
    assert!(env.contains("SPARK_WORKER_MEMORY=\"16g\""));
}

/// Story: raw overrides replace computed values and create new artifacts
///
/// The edge group overrides the role-tier core count in spark-env.sh and
/// supplies a metrics file the catalog knows nothing about.
#[test]
fn story_config_overrides_take_final_precedence() {
    let units = UnitRegistry::builtin();
    let catalog = catalog::spark_defaults(&units).expect("builtin catalog loads");
    let engine = ConfigEngine::new(&catalog, &units);

    let compiled = engine.compile(&sample_manifest()).expect("compiles");

    let env = compiled
        .file(SparkRole::Worker, "edge", SPARK_ENV_SH)
        .expect("edge env artifact");
    assert!(env.contains("SPARK_WORKER_CORES=\"1\""), "override wins");
    assert!(!env.contains("SPARK_WORKER_CORES=\"4\""));

    let metrics = compiled
        .file(SparkRole::Worker, "edge", "metrics.properties")
        .expect("override-created artifact");
    assert_eq!(metrics, "*.sink.console.period=10\n");
}

/// Story: the history server gets its event log directory by default
#[test]
fn story_history_server_log_directory_defaults() {
    let units = UnitRegistry::builtin();
    let catalog = catalog::spark_defaults(&units).expect("builtin catalog loads");
    let engine = ConfigEngine::new(&catalog, &units);

    let compiled = engine.compile(&sample_manifest()).expect("compiles");

    let defaults = compiled
        .file(SparkRole::HistoryServer, "default", SPARK_DEFAULTS_CONF)
        .expect("history server defaults artifact");
    assert!(defaults.contains("spark.history.fs.logDirectory=/tmp/spark-events"));
}

/// Story: unknown properties pass through into the primary config file
#[test]
fn story_unknown_properties_pass_through() {
    let units = UnitRegistry::builtin();
    let catalog = catalog::spark_defaults(&units).expect("builtin catalog loads");
    let engine = ConfigEngine::new(&catalog, &units);

    let spec = parse_spec(
        r#"
version: "3.0.1"
roles:
  master:
    roleGroups:
      default:
        replicas: 1
        config:
          spark.ui.reverseProxy: "true"
"#,
    );
    let compiled = engine.compile(&spec).expect("compiles");

    let defaults = compiled
        .file(SparkRole::Master, "default", SPARK_DEFAULTS_CONF)
        .expect("defaults artifact");
    assert!(defaults.contains("spark.ui.reverseProxy=true"));

    let group = compiled
        .group(SparkRole::Master, "default")
        .expect("group present");
    assert!(!group.has_fatal_diagnostics());
    assert!(group
        .diagnostics
        .iter()
        .any(|d| d.to_string().contains("spark.ui.reverseProxy")));
}

/// Story: a group failing a requirement renders nothing, others still do
///
/// Targeting 1.5.0, SPARK_NO_DAEMONIZE has no default yet; groups that do
/// not set it explicitly fail, the one that does keeps its artifacts.
#[test]
fn story_fatal_group_does_not_poison_the_cluster() {
    let units = UnitRegistry::builtin();
    let catalog = catalog::spark_defaults(&units).expect("builtin catalog loads");
    let engine = ConfigEngine::new(&catalog, &units);

    let spec = parse_spec(
        r#"
version: "1.5.0"
roles:
  master:
    roleGroups:
      default:
        replicas: 1
  worker:
    roleGroups:
      default:
        replicas: 1
        config:
          SPARK_NO_DAEMONIZE: "true"
"#,
    );
    let compiled = engine.compile(&spec).expect("compiles");

    let master = compiled
        .group(SparkRole::Master, "default")
        .expect("master group present");
    assert!(master.has_fatal_diagnostics());
    assert!(master.files.is_empty());

    let worker = compiled
        .group(SparkRole::Worker, "default")
        .expect("worker group present");
    assert!(!worker.has_fatal_diagnostics());
    let env = worker.files.get(SPARK_ENV_SH).expect("worker env artifact");
    assert!(env.contains("SPARK_NO_DAEMONIZE=\"true\""));
}

/// Story: resolution is deterministic across repeated compiles
#[test]
fn story_repeated_compiles_are_byte_identical() {
    let units = UnitRegistry::builtin();
    let catalog = catalog::spark_defaults(&units).expect("builtin catalog loads");
    let engine = ConfigEngine::new(&catalog, &units);

    let spec = sample_manifest();
    let first = engine.compile(&spec).expect("first compile");
    let second = engine.compile(&spec).expect("second compile");
    assert_eq!(first, second);
}
