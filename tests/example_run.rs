//! Integration tests for the `example run` command.
use lcoe_eval::cli::example::handle_example_run_command;
use lcoe_eval::cli::{EvaluateOpts, RunOpts};
use lcoe_eval::settings::Settings;
use tempfile::tempdir;

/// An integration test for the `example run` command.
#[test]
fn test_handle_example_run_command() {
    unsafe { std::env::set_var("LCOE_EVAL_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path().join("results");
    handle_example_run_command(
        "chain",
        &EvaluateOpts {
            processes: "Gasifier, Gas turbine, PV plant".to_string(),
            chain: "Gasifier, Gas turbine".to_string(),
        },
        &RunOpts {
            output_dir: Some(output_dir.clone()),
            overwrite: false,
            raw_tables: true,
        },
        Some(Settings::default()),
    )
    .unwrap();

    // The chain model's results include the per-commodity raw table
    assert!(output_dir.join("lcoe_North.csv").is_file());
    assert!(output_dir.join("lcoe_North_Elec.csv").is_file());
}
