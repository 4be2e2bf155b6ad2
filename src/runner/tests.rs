//! Tests for the step machine.
//!
//! Stage commands are real `sh` command lines, so the execution tests are
//! Unix-only. Dry-run tests never spawn a process and run everywhere.

use super::*;
use crate::config::RunnerConfig;
use crate::events::{EVENTS_FILE_NAME, Event};
use crate::exit_codes;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn settings_with(
    dir: &Path,
    auto: &str,
    planner: &str,
    looper: &str,
    edit: impl FnOnce(&mut RunnerConfig),
) -> RunSettings {
    let mut config = RunnerConfig::default();
    config.templates.insert("rw-auto".to_string(), auto.to_string());
    config
        .templates
        .insert("rw-planner".to_string(), planner.to_string());
    config.templates.insert("rw-loop".to_string(), looper.to_string());
    edit(&mut config);

    RunSettings::resolve(config, dir)
        .unwrap()
        .with_echo_children(false)
}

fn run_to_string(settings: &RunSettings) -> (Result<RunOutcome>, String) {
    let mut buf = Vec::new();
    let result = run(settings, &mut buf);
    (result, String::from_utf8(buf).unwrap())
}

fn journal_events(settings: &RunSettings) -> Vec<Event> {
    let content = fs::read_to_string(settings.log_dir.join(EVENTS_FILE_NAME)).unwrap();
    content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_step_log_name_is_zero_padded() {
    assert_eq!(step_log_name(1, AgentId::Auto), "step-01-rw-auto.log");
    assert_eq!(step_log_name(12, AgentId::Loop), "step-12-rw-loop.log");
    assert_eq!(step_log_name(100, AgentId::Planner), "step-100-rw-planner.log");
}

#[test]
fn test_dry_run_follows_fixed_progression() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_with(
        temp_dir.path(),
        "definitely-not-a-command {summary}",
        "exit 99",
        "rm -rf / --this-never-runs",
        |c| c.summary = Some("preview".to_string()),
    )
    .with_dry_run(true);

    let (result, report) = run_to_string(&settings);
    let outcome = result.unwrap();

    let agents: Vec<_> = outcome.steps.iter().map(|s| s.agent).collect();
    assert_eq!(agents, AgentId::ALL.to_vec());
    assert!(outcome.steps.iter().all(|s| s.log_path.is_none()));
    assert_eq!(outcome.steps[0].command, "definitely-not-a-command preview");
    assert_eq!(outcome.steps[2].next, Route::Done);

    assert!(report.contains("RUNNER_DRY_RUN=1\n"));
    assert!(report.contains("RUNNER_DRY_RUN_NEXT=rw-planner\n"));
    assert!(report.contains("RUNNER_DRY_RUN_NEXT=rw-loop\n"));
    assert!(report.contains("RUNNER_DRY_RUN_NEXT=done\n"));
    assert!(report.ends_with("RUNNER_STATUS=DONE\n"));
    assert!(!report.contains("RUNNER_STEP_LOG="));
}

#[test]
fn test_dry_run_from_later_stage() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_with(temp_dir.path(), "a", "b", "c", |c| {
        c.start = Some("rw-loop".to_string());
    })
    .with_dry_run(true);

    let (result, _) = run_to_string(&settings);
    let outcome = result.unwrap();
    assert_eq!(outcome.steps.len(), 1);
    assert_eq!(outcome.steps[0].agent, AgentId::Loop);
}

#[test]
fn test_dry_run_respects_ceiling() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_with(temp_dir.path(), "a", "b", "c", |c| c.max_steps = Some(2))
        .with_dry_run(true);

    let (result, report) = run_to_string(&settings);
    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::BUDGET_EXHAUSTED);
    assert_eq!(report.matches("RUNNER_STEP=").count(), 2);
}

#[test]
fn test_dry_run_writes_no_logs_or_journal() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_with(temp_dir.path(), "a", "b", "c", |_| {}).with_dry_run(true);

    run_to_string(&settings).0.unwrap();

    assert!(settings.log_dir.is_dir());
    assert_eq!(fs::read_dir(&settings.log_dir).unwrap().count(), 0);
}

#[test]
fn test_header_lines() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_with(temp_dir.path(), "a", "b", "c", |c| {
        c.start = Some("rw-planner".to_string());
        c.max_steps = Some(7);
    })
    .with_dry_run(true);

    let (_, report) = run_to_string(&settings);
    let expected = format!(
        "RUNNER_MODE=TOP_LEVEL\nRUNNER_DRY_RUN=1\nRUNNER_START=rw-planner\n\
         RUNNER_MAX_STEPS=7\nRUNNER_LOG_DIR={}\nRUNNER_STEP=1\n",
        settings.log_dir.display()
    );
    assert!(report.starts_with(&expected), "{}", report);
}

#[cfg(unix)]
mod execution {
    use super::*;

    #[test]
    fn test_three_stage_run_reaches_done() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings_with(
            temp_dir.path(),
            "echo routing; echo NEXT_COMMAND=rw-planner",
            "echo NEXT_COMMAND=rw-loop",
            "echo NEXT_COMMAND=done",
            |c| c.max_steps = Some(3),
        );

        let (result, report) = run_to_string(&settings);
        let outcome = result.unwrap();

        assert_eq!(outcome.steps.len(), 3);
        let numbers: Vec<_> = outcome.steps.iter().map(|s| s.step).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(outcome.steps[2].next, Route::Done);

        assert!(report.contains("RUNNER_NEXT_COMMAND=rw-planner\n"));
        assert!(report.contains("RUNNER_NEXT_COMMAND=rw-loop\n"));
        assert!(report.contains("RUNNER_NEXT_COMMAND=done\n"));
        assert!(report.ends_with("RUNNER_STATUS=DONE\n"));

        let first_log = settings.log_dir.join("step-01-rw-auto.log");
        assert_eq!(
            fs::read_to_string(&first_log).unwrap(),
            "routing\nNEXT_COMMAND=rw-planner\n"
        );
        assert!(settings.log_dir.join("step-02-rw-planner.log").exists());
        assert!(settings.log_dir.join("step-03-rw-loop.log").exists());
        assert!(report.contains(&format!("RUNNER_STEP_LOG={}\n", first_log.display())));
    }

    #[test]
    fn test_child_failure_stops_after_first_step() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings_with(
            temp_dir.path(),
            "echo about to fail; echo NEXT_COMMAND=rw-planner; echo oops >&2; exit 2",
            "echo NEXT_COMMAND=done",
            "echo NEXT_COMMAND=done",
            |_| {},
        );

        let (result, report) = run_to_string(&settings);
        let err = result.unwrap_err();

        assert_eq!(err.to_string(), "RUNNER_CHILD_EXIT_NONZERO code=2 agent=rw-auto");
        assert_eq!(err.exit_code(), exit_codes::CHILD_FAILURE);
        assert_eq!(report.matches("RUNNER_STEP=").count(), 1);
        assert!(!report.contains("RUNNER_NEXT_COMMAND="));

        let log = fs::read_to_string(settings.log_dir.join("step-01-rw-auto.log")).unwrap();
        assert_eq!(log, "about to fail\nNEXT_COMMAND=rw-planner\noops\n");
        assert!(!settings.log_dir.join("step-02-rw-planner.log").exists());
    }

    #[test]
    fn test_missing_directive_fails_after_writing_log() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings_with(
            temp_dir.path(),
            "echo finished without saying where to go",
            "echo NEXT_COMMAND=done",
            "echo NEXT_COMMAND=done",
            |_| {},
        );

        let (result, _) = run_to_string(&settings);
        let err = result.unwrap_err();

        assert_eq!(err.to_string(), "RUNNER_NEXT_COMMAND_MISSING agent=rw-auto");
        assert_eq!(err.exit_code(), exit_codes::MISSING_DIRECTIVE);
        assert!(settings.log_dir.join("step-01-rw-auto.log").exists());
    }

    #[test]
    fn test_unknown_directive_counts_as_missing() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings_with(
            temp_dir.path(),
            "echo NEXT_COMMAND=rw-review",
            "true",
            "true",
            |_| {},
        );

        let err = run_to_string(&settings).0.unwrap_err();
        assert_eq!(err.reason(), "RUNNER_NEXT_COMMAND_MISSING");
    }

    #[test]
    fn test_legacy_token_routes() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings_with(
            temp_dir.path(),
            "echo AUTO_ROUTE_TARGET=rw-loop",
            "exit 1",
            "echo NEXT_COMMAND=done",
            |_| {},
        );

        let outcome = run_to_string(&settings).0.unwrap();
        let agents: Vec<_> = outcome.steps.iter().map(|s| s.agent).collect();
        assert_eq!(agents, vec![AgentId::Auto, AgentId::Loop]);
    }

    #[test]
    fn test_directive_on_stderr_is_honored() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings_with(
            temp_dir.path(),
            "echo NEXT_COMMAND=done >&2",
            "true",
            "true",
            |_| {},
        );

        let outcome = run_to_string(&settings).0.unwrap();
        assert_eq!(outcome.steps.len(), 1);
    }

    #[test]
    fn test_budget_exhausted_after_exact_ceiling() {
        let temp_dir = TempDir::new().unwrap();
        let counter = temp_dir.path().join("count.txt");
        let settings = settings_with(
            temp_dir.path(),
            "echo x >> count.txt; echo NEXT_COMMAND=rw-auto",
            "echo NEXT_COMMAND=rw-planner",
            "echo NEXT_COMMAND=rw-loop",
            |c| c.max_steps = Some(2),
        );

        let (result, report) = run_to_string(&settings);
        let err = result.unwrap_err();

        assert_eq!(err.to_string(), "RUNNER_MAX_STEPS_REACHED max_steps=2");
        assert_eq!(err.exit_code(), exit_codes::BUDGET_EXHAUSTED);
        assert_eq!(fs::read_to_string(&counter).unwrap().lines().count(), 2);
        assert_eq!(report.matches("RUNNER_STEP=").count(), 2);
        assert!(settings.log_dir.join("step-01-rw-auto.log").exists());
        assert!(settings.log_dir.join("step-02-rw-auto.log").exists());
        assert!(!settings.log_dir.join("step-03-rw-auto.log").exists());
    }

    #[test]
    fn test_same_agent_recurs_as_independent_steps() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings_with(
            temp_dir.path(),
            "echo NEXT_COMMAND=rw-planner",
            "if [ \"$RW_RUNNER_STEP\" -lt 4 ]; then echo NEXT_COMMAND=rw-planner; \
             else echo NEXT_COMMAND=done; fi",
            "true",
            |_| {},
        );

        let outcome = run_to_string(&settings).0.unwrap();
        let agents: Vec<_> = outcome.steps.iter().map(|s| s.agent).collect();
        assert_eq!(
            agents,
            vec![AgentId::Auto, AgentId::Planner, AgentId::Planner, AgentId::Planner]
        );
        for step in 2..=4 {
            let name = step_log_name(step, AgentId::Planner);
            assert!(settings.log_dir.join(name).exists());
        }
    }

    #[test]
    fn test_template_and_env_carry_step_context() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings_with(
            temp_dir.path(),
            "echo NEXT_COMMAND=rw-planner",
            "echo step={step} agent={agent} json={summary_json} flags={loop_flags}; \
             echo env=$RW_RUNNER_STEP/$RW_RUNNER_AGENT/$RW_FEATURE_SUMMARY/$RW_LOOP_FLAGS; \
             echo keep={unknown}; echo NEXT_COMMAND=done",
            "true",
            |c| {
                c.summary = Some("login".to_string());
                c.loop_flags = Some("fast".to_string());
            },
        );

        let outcome = run_to_string(&settings).0.unwrap();
        let log = fs::read_to_string(outcome.steps[1].log_path.as_ref().unwrap()).unwrap();

        assert!(outcome.steps[1].command.contains("step=2 agent=rw-planner"));
        assert!(log.contains("step=2 agent=rw-planner json=login flags=fast\n"));
        assert!(log.contains("env=2/rw-planner/login/fast\n"));
        assert!(log.contains("keep={unknown}\n"));
    }

    #[test]
    fn test_commands_run_in_configured_cwd() {
        let temp_dir = TempDir::new().unwrap();
        let work = temp_dir.path().join("work");
        fs::create_dir_all(&work).unwrap();
        fs::write(work.join("route.txt"), "NEXT_COMMAND=done\n").unwrap();

        let settings = settings_with(temp_dir.path(), "cat route.txt", "true", "true", |c| {
            c.cwd = Some(PathBuf::from("work"));
        });

        let outcome = run_to_string(&settings).0.unwrap();
        assert_eq!(outcome.steps.len(), 1);
        assert!(settings.log_dir.starts_with(&work));
    }

    #[test]
    fn test_existing_step_log_is_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let settings =
            settings_with(temp_dir.path(), "echo NEXT_COMMAND=done", "true", "true", |_| {});
        fs::create_dir_all(&settings.log_dir).unwrap();
        let log = settings.log_dir.join("step-01-rw-auto.log");
        fs::write(&log, "stale output from a previous run\n").unwrap();

        run_to_string(&settings).0.unwrap();

        assert_eq!(fs::read_to_string(&log).unwrap(), "NEXT_COMMAND=done\n");
    }

    #[test]
    fn test_journal_records_run() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings_with(
            temp_dir.path(),
            "echo NEXT_COMMAND=rw-loop",
            "true",
            "echo NEXT_COMMAND=done",
            |_| {},
        );

        run_to_string(&settings).0.unwrap();

        let events = journal_events(&settings);
        let actions: Vec<_> = events.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                EventAction::RunStart,
                EventAction::StepComplete,
                EventAction::StepComplete,
                EventAction::RunDone,
            ]
        );
        assert_eq!(events[1].step, Some(1));
        assert_eq!(events[1].agent.as_deref(), Some("rw-auto"));
        assert_eq!(events[1].details["next"], "rw-loop");
        assert_eq!(events[3].details["steps"], 2);
        assert_eq!(events[3].details["trace"][1]["agent"], "rw-loop");
        assert_eq!(events[3].details["trace"][1]["next"], "done");
    }

    #[test]
    fn test_journal_records_failure_reason() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings_with(temp_dir.path(), "exit 3", "true", "true", |_| {});

        run_to_string(&settings).0.unwrap_err();

        let events = journal_events(&settings);
        let last = events.last().unwrap();
        assert_eq!(last.action, EventAction::RunFailed);
        assert_eq!(last.details["reason"], "RUNNER_CHILD_EXIT_NONZERO code=3 agent=rw-auto");
        assert_eq!(last.details["reason_code"], "RUNNER_CHILD_EXIT_NONZERO");
        assert_eq!(events[1].details["exit_code"], 3);
        assert!(events[1].details["next"].is_null());
    }

    #[test]
    fn test_unwritable_log_dir_is_unexpected_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();

        let settings = settings_with(temp_dir.path(), "true", "true", "true", |c| {
            c.log_dir = Some(blocker.join("logs"));
        });

        let (result, report) = run_to_string(&settings);
        let err = result.unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::UNEXPECTED);
        assert!(err.to_string().contains("create log directory"));
        assert!(report.is_empty());
    }
}
