//! CLI integration tests: real INI and CSV files on disk, commands run through
//! `cli::execute`.

mod common;

use clap::Parser;
use common::*;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use tempfile::TempDir;
use trendscore::adapters::file_config_adapter::FileConfigAdapter;
use trendscore::cli::{self, Cli};
use trendscore::domain::error::TrendscoreError;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// BBCA: 300-bar uptrend. TLKM: 20 bars, too short to backtest.
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir_all(&data).unwrap();
        write_csv(&data, "BBCA", "IDX", &bars_from_closes("BBCA", &uptrend_closes(300)));
        write_csv(&data, "TLKM", "IDX", &bars_from_closes("TLKM", &uptrend_closes(20)));
        Self { dir }
    }

    fn data_dir(&self) -> String {
        self.dir.path().join("data").display().to_string()
    }

    fn output_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("out")
    }

    fn ini(&self, extra_signal: &str, codes: &str) -> tempfile::NamedTempFile {
        write_temp_ini(&format!(
            r#"
[signal]
{extra_signal}

[backtest]
data_dir = {data}
exchange = IDX
codes = {codes}
warmup = 50
stop_loss = 5.0
take_profit = 10.0

[report]
output_dir = {out}
"#,
            data = self.data_dir(),
            out = self.output_dir().display(),
        ))
    }
}

const ALWAYS_BUY: &str = "buy_threshold = -9.0\nsell_threshold = -9.5\nshort_threshold = -10.0";

fn execute(args: &[&str]) -> Result<(), TrendscoreError> {
    let mut argv = vec!["trendscore"];
    argv.extend_from_slice(args);
    cli::execute(Cli::try_parse_from(argv).unwrap().command)
}

fn path_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

mod validate_command {
    use super::*;

    #[test]
    fn valid_config_passes() {
        let ws = Workspace::new();
        let ini = ws.ini("", "BBCA,TLKM");
        assert!(execute(&["validate", "--config", path_str(ini.path())]).is_ok());
    }

    #[test]
    fn misordered_thresholds_fail() {
        let ws = Workspace::new();
        let ini = ws.ini("buy_threshold = -1.0\nsell_threshold = 0.0", "BBCA");
        let err = execute(&["validate", "--config", path_str(ini.path())]).unwrap_err();
        assert!(matches!(err, TrendscoreError::ConfigInvalid { ref key, .. } if key == "sell_threshold"));
    }

    #[test]
    fn missing_codes_fail() {
        let ini = write_temp_ini("[backtest]\nexchange = IDX\n");
        let err = execute(&["validate", "--config", path_str(ini.path())]).unwrap_err();
        assert!(matches!(err, TrendscoreError::ConfigMissing { ref key, .. } if key == "codes"));
    }

    #[test]
    fn missing_file_is_parse_error() {
        let err = execute(&["validate", "--config", "/nonexistent/trendscore.ini"]).unwrap_err();
        assert!(matches!(err, TrendscoreError::ConfigParse { .. }));
    }
}

mod list_symbols_command {
    use super::*;

    #[test]
    fn lists_configured_exchange() {
        let ws = Workspace::new();
        let ini = ws.ini("", "BBCA");
        assert!(execute(&["list-symbols", "--config", path_str(ini.path())]).is_ok());
        assert!(
            execute(&[
                "list-symbols",
                "--config",
                path_str(ini.path()),
                "--exchange",
                "NYSE"
            ])
            .is_ok()
        );
    }

    #[test]
    fn missing_data_dir_is_data_error() {
        let ini = write_temp_ini("[backtest]\ndata_dir = /nonexistent/trendscore\nexchange = IDX\n");
        let err = execute(&["list-symbols", "--config", path_str(ini.path())]).unwrap_err();
        assert!(matches!(err, TrendscoreError::Data { .. }));
    }
}

mod score_command {
    use super::*;

    #[test]
    fn scores_available_symbols() {
        let ws = Workspace::new();
        let ini = ws.ini("", "BBCA,TLKM");
        assert!(execute(&["score", "--config", path_str(ini.path())]).is_ok());
        assert!(execute(&["score", "--config", path_str(ini.path()), "--json"]).is_ok());
    }

    #[test]
    fn unknown_code_only_is_no_data() {
        let ws = Workspace::new();
        let ini = ws.ini("", "BBCA");
        let err = execute(&["score", "--config", path_str(ini.path()), "--code", "ZZZZ"])
            .unwrap_err();
        assert!(matches!(err, TrendscoreError::NoData { ref code, .. } if code == "ZZZZ"));
    }
}

mod backtest_command {
    use super::*;

    #[test]
    fn save_writes_trades_and_report() {
        let ws = Workspace::new();
        let ini = ws.ini(ALWAYS_BUY, "BBCA,TLKM");
        execute(&["backtest", "--config", path_str(ini.path()), "--save"]).unwrap();

        let trades_csv = ws.output_dir().join("trades_BBCA.csv");
        let report_json = ws.output_dir().join("report_BBCA.json");
        assert!(trades_csv.exists());
        assert!(report_json.exists());
        // too short: skipped during universe validation
        assert!(!ws.output_dir().join("trades_TLKM.csv").exists());

        let csv = std::fs::read_to_string(trades_csv).unwrap();
        assert!(csv.lines().count() > 1);
        assert!(csv.lines().skip(1).all(|l| l.ends_with(",long,take_profit")));

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(report_json).unwrap()).unwrap();
        assert_eq!(value["symbol"], "BBCA");
        assert_eq!(value["report"]["win_rate"], 1.0);
        assert_eq!(
            value["report"]["total_trades"].as_u64(),
            Some(csv.lines().count() as u64 - 1)
        );
    }

    #[test]
    fn json_output_without_save_writes_nothing() {
        let ws = Workspace::new();
        let ini = ws.ini(ALWAYS_BUY, "BBCA");
        execute(&["backtest", "--config", path_str(ini.path()), "--json"]).unwrap();
        assert!(!ws.output_dir().exists());
    }

    #[test]
    fn only_short_symbols_is_insufficient_data() {
        let ws = Workspace::new();
        let ini = ws.ini("", "TLKM");
        let err = execute(&["backtest", "--config", path_str(ini.path())]).unwrap_err();
        assert!(matches!(err, TrendscoreError::InsufficientData { .. }));
    }

    #[test]
    fn code_override_replaces_universe() {
        let ws = Workspace::new();
        let ini = ws.ini("", "TLKM");
        assert!(
            execute(&["backtest", "--config", path_str(ini.path()), "--code", "bbca"]).is_ok()
        );
    }

    #[test]
    fn invalid_stop_loss_is_config_error() {
        let ws = Workspace::new();
        let ini = write_temp_ini(&format!(
            "[backtest]\ndata_dir = {}\nexchange = IDX\ncodes = BBCA\nstop_loss = 0\n",
            ws.data_dir()
        ));
        let err = execute(&["backtest", "--config", path_str(ini.path())]).unwrap_err();
        assert!(matches!(err, TrendscoreError::ConfigInvalid { ref key, .. } if key == "stop_loss"));
    }
}

mod exit_codes {
    use super::*;

    fn exit_code_of(err: &TrendscoreError) -> String {
        format!("{:?}", ExitCode::from(err))
    }

    #[test]
    fn errors_map_to_documented_codes() {
        let config_err = TrendscoreError::config_invalid("signal", "buy_threshold", "bad");
        assert_eq!(exit_code_of(&config_err), format!("{:?}", ExitCode::from(2)));

        let data_err = TrendscoreError::Data {
            reason: "x".into(),
        };
        assert_eq!(exit_code_of(&data_err), format!("{:?}", ExitCode::from(3)));

        let no_data = TrendscoreError::NoData {
            code: "BBCA".into(),
            exchange: "IDX".into(),
        };
        assert_eq!(exit_code_of(&no_data), format!("{:?}", ExitCode::from(5)));

        let export = TrendscoreError::Export {
            reason: "disk full".into(),
        };
        assert_eq!(exit_code_of(&export), format!("{:?}", ExitCode::from(6)));
    }

    #[test]
    fn config_from_string_roundtrips_through_builder() {
        let adapter = FileConfigAdapter::from_string(
            "[backtest]\nstop_loss = 2.5\ntake_profit = 7.5\nallow_shorting = true\n",
        )
        .unwrap();
        let (bt, _) = cli::build_backtest_config(&adapter).unwrap();
        assert_eq!(bt.simulator.stop_loss, 0.025);
        assert_eq!(bt.simulator.take_profit, 0.075);
        assert!(bt.simulator.allow_shorting);
    }
}
