use std::{fs, path::Path};

use tempfile::tempdir;

use fretwork_cli::{Args, CliError, Command, ConfigError, run};

const SONG: &str = "<html>\n<body>\n<table>\n\
    <tr class=ch><td>G</td><td>C</td></tr>\n\
    <tr class=ly><td>Friday night</td><td>and the lights are low</td></tr>\n\
    </table>\n</body>\n</html>\n";

fn args(dir: &Path, command: Command) -> Args {
    let config = dir.join("config.toml");
    if !config.exists() {
        fs::write(&config, "[document]\nimage_height = 90\n").expect("Failed to write config");
    }

    Args {
        command,
        config: Some(config.to_string_lossy().to_string()),
        challenges: dir.join("challenges.txt").to_string_lossy().to_string(),
        api_key_file: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_annotate_without_credentials_keeps_song() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("s_friday.html");
    let output = temp_dir.path().join("out.html");
    fs::write(&input, SONG).unwrap();

    let args = args(
        temp_dir.path(),
        Command::Annotate {
            input: input.to_string_lossy().to_string(),
            output: Some(output.to_string_lossy().to_string()),
            challenge: Some("Use only triads".to_string()),
            page: false,
        },
    );

    let result = run(&args);
    assert!(result.is_ok(), "Annotation should succeed: {:?}", result.err());
    assert_eq!(fs::read_to_string(&output).unwrap(), SONG);
}

#[test]
fn e2e_annotate_page_adds_banner() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("s_friday.html");
    let output = temp_dir.path().join("out.html");
    fs::write(&input, SONG).unwrap();
    fs::write(temp_dir.path().join("challenges.txt"), "Add 9ths to every other chord\n").unwrap();

    let args = args(
        temp_dir.path(),
        Command::Annotate {
            input: input.to_string_lossy().to_string(),
            output: Some(output.to_string_lossy().to_string()),
            challenge: None,
            page: true,
        },
    );

    run(&args).expect("Annotation should succeed");
    let page = fs::read_to_string(&output).unwrap();
    assert!(page.contains("<strong>Chord Challenge:</strong> Add 9ths to every other chord</div>"));
    assert_eq!(page.matches("chord-challenge").count(), 1);
}

#[test]
fn e2e_missing_input_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let args = args(
        temp_dir.path(),
        Command::Annotate {
            input: temp_dir.path().join("nope.html").to_string_lossy().to_string(),
            output: None,
            challenge: None,
            page: false,
        },
    );

    assert!(matches!(run(&args), Err(CliError::Fretwork(_))));
}

#[test]
fn e2e_invalid_config_is_reported() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    fs::write(temp_dir.path().join("config.toml"), "[document]\nimage_height = -3\n").unwrap();

    let args = args(
        temp_dir.path(),
        Command::Annotate {
            input: "unused.html".to_string(),
            output: None,
            challenge: None,
            page: false,
        },
    );

    assert!(matches!(
        run(&args),
        Err(CliError::Config(ConfigError::Parse { .. }))
    ));
}

#[test]
fn e2e_invalid_values_are_rejected() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    fs::write(temp_dir.path().join("config.toml"), "[suggestion]\ntimeout_secs = 0\n").unwrap();

    let args = args(
        temp_dir.path(),
        Command::Annotate {
            input: "unused.html".to_string(),
            output: None,
            challenge: None,
            page: false,
        },
    );

    assert!(matches!(run(&args), Err(CliError::Fretwork(_))));
}

#[test]
fn e2e_generate_challenges_without_credentials_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("fresh.txt");

    let args = args(
        temp_dir.path(),
        Command::GenerateChallenges {
            output: Some(output.to_string_lossy().to_string()),
            count: 10,
        },
    );

    assert!(matches!(
        run(&args),
        Err(CliError::Fretwork(fretwork::FretworkError::Service(
            fretwork::ServiceError::MissingCredentials
        )))
    ));
    assert!(!output.exists());
}
