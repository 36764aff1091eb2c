use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use posehead_q15::core::systems::PipelineConfig;
use posehead_q15::core::transform::{read_npy_f32, SafetensorsModel, TensorProvider};
use posehead_q15::core::validator::{compare, CompareOptions, ValidationSummary};
use posehead_q15::pipeline::{
    capture_golden, check_exported_weights, emulate_heads, export_head_weights, make_golden_q15_streams,
    make_head_streams, prepare_memory_blobs, recover_backbone_feature, run_all, validate_golden,
    RecordedRunner,
};
use std::path::PathBuf;
use std::process;

fn main() {
    env_logger::init();

    let matches = Command::new("posehead")
        .version("0.1.0")
        .about("포즈 헤드 Q15 가중치 내보내기, 특징 복원, 하드웨어 스트림 패킹")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .global(true)
                .help("파이프라인 설정 JSON (없으면 기본값)"),
        )
        .subcommand(Command::new("init-config").about("기본 설정 JSON 기록").arg(
            Arg::new("output").required(true).help("출력 파일 경로"),
        ))
        .subcommand(
            Command::new("list-tensors")
                .about("모델 텐서 목록")
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .short('f')
                        .value_name("SUBSTRING")
                        .help("이름 부분 문자열"),
                ),
        )
        .subcommand(Command::new("export").about("헤드 가중치 fp32/Q15 내보내기와 매니페스트"))
        .subcommand(Command::new("check-weights").about("내보낸 가중치를 모델 텐서와 대조"))
        .subcommand(Command::new("streams").about("헤드 가중치/바이어스 텍스트 스트림"))
        .subcommand(Command::new("golden-q15").about("골든 헤드 출력 Q15 스트림"))
        .subcommand(Command::new("recover").about("백본 특징 복원과 입력 스트림"))
        .subcommand(Command::new("blobs").about("메모리 블롭과 PLIO 스트림"))
        .subcommand(Command::new("emulate").about("FC 참조 커널로 헤드 출력 예측"))
        .subcommand(
            Command::new("import-golden")
                .about("외부 추론 결과를 골든 디렉터리로 가져오기")
                .arg(Arg::new("input").required(true).help("입력 .npy ((1,1,H,W,C) 허용)"))
                .arg(
                    Arg::new("outputs")
                        .required(true)
                        .help("golden_{name}_fp32.npy 출력들이 있는 디렉터리"),
                ),
        )
        .subcommand(
            Command::new("validate-golden")
                .about("기록된 추론 결과를 골든 출력과 비교")
                .arg(
                    Arg::new("recorded")
                        .required(true)
                        .help("다시 실행한 출력들이 있는 디렉터리"),
                ),
        )
        .subcommand(
            Command::new("compare")
                .about(".npy 두 개 비교")
                .arg(Arg::new("golden").required(true))
                .arg(Arg::new("candidate").required(true))
                .arg(Arg::new("rtol").long("rtol").value_name("RTOL").default_value("1e-5"))
                .arg(Arg::new("atol").long("atol").value_name("ATOL").default_value("1e-7")),
        )
        .subcommand(
            Command::new("run")
                .about("내보내기부터 커널 에뮬레이션까지 전체 실행")
                .arg(
                    Arg::new("check-weights")
                        .long("check-weights")
                        .action(ArgAction::SetTrue)
                        .help("내보낸 가중치 재검증도 수행"),
                ),
        )
        .get_matches();

    match dispatch(&matches) {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(e) => {
            eprintln!("❌ 오류: {:#}", e);
            process::exit(1);
        }
    }
}

/// 성공 시 검증 통과 여부
fn dispatch(matches: &ArgMatches) -> Result<bool> {
    let config = load_config(matches)?;

    match matches.subcommand() {
        Some(("init-config", m)) => {
            let output = path_arg(m, "output")?;
            config.save_json(&output)?;
            println!("✅ 설정 기록: {}", output.display());
            Ok(true)
        }
        Some(("list-tensors", m)) => {
            let model = open_model(&config)?;
            let filter = m.get_one::<String>("filter");
            for descriptor in model.tensor_listing()? {
                if filter.map_or(true, |f| descriptor.name.contains(f.as_str())) {
                    println!("{}", descriptor);
                }
            }
            Ok(true)
        }
        Some(("export", _)) => {
            let model = open_model(&config)?;
            let (_, exported) = export_head_weights(&config, &model)?;
            for head in &exported {
                println!(
                    "✅ {}: Q15 min={}, max={}, 포화 {}",
                    head.name, head.weight_stats.min, head.weight_stats.max, head.weight_stats.saturated
                );
            }
            Ok(true)
        }
        Some(("check-weights", _)) => {
            let model = open_model(&config)?;
            report(check_exported_weights(&config, &model)?)
        }
        Some(("streams", _)) => {
            make_head_streams(&config)?;
            println!("✅ 헤드 스트림 기록: {}", config.paths.stream_dir.display());
            Ok(true)
        }
        Some(("golden-q15", _)) => {
            for (name, stats) in make_golden_q15_streams(&config)? {
                println!("✅ {}: {}개, min={}, max={}", name, stats.num_elements, stats.min, stats.max);
            }
            Ok(true)
        }
        Some(("recover", _)) => {
            let result = recover_backbone_feature(&config)?;
            let diag = &result.recovered.diagnostics;
            println!("A: {}×{}, rank {}", diag.rows, diag.cols, diag.rank);
            println!("잔차 제곱합: {:.6e}", diag.residual_sum_squares);
            report(result.summary)
        }
        Some(("blobs", _)) => {
            let blobs = prepare_memory_blobs(&config)?;
            for blob in &blobs {
                println!("✅ {}: FC {:?}", blob.name, blob.fc.dim());
            }
            Ok(true)
        }
        Some(("emulate", _)) => {
            let (_, summary) = emulate_heads(&config)?;
            report(summary)
        }
        Some(("import-golden", m)) => {
            let input = read_npy_f32(&path_arg(m, "input")?)?;
            let mut runner = RecordedRunner::from_dir(&config, &path_arg(m, "outputs")?)?;
            for path in capture_golden(&config, &mut runner, input)? {
                println!("✅ {}", path.display());
            }
            Ok(true)
        }
        Some(("validate-golden", m)) => {
            let mut runner = RecordedRunner::from_dir(&config, &path_arg(m, "recorded")?)?;
            report(validate_golden(&config, &mut runner)?)
        }
        Some(("compare", m)) => {
            let options = CompareOptions {
                rtol: float_arg(m, "rtol")?,
                atol: float_arg(m, "atol")?,
                ..CompareOptions::golden()
            };
            let golden = read_npy_f32(&path_arg(m, "golden")?)?;
            let candidate = read_npy_f32(&path_arg(m, "candidate")?)?;
            let comparison = compare("candidate", &golden, &candidate, &options);
            println!("{}", comparison);
            Ok(comparison.passed)
        }
        Some(("run", m)) => {
            let model = open_model(&config)?;
            let mut summary = run_all(&config, &model)?;
            if m.get_flag("check-weights") {
                summary.extend(check_exported_weights(&config, &model)?);
            }
            report(summary)
        }
        _ => Err(anyhow!("명령을 지정해주세요. --help를 참조하세요.")),
    }
}

fn load_config(matches: &ArgMatches) -> Result<PipelineConfig> {
    match matches.get_one::<String>("config") {
        Some(path) => PipelineConfig::from_json_file(&PathBuf::from(path))
            .with_context(|| format!("설정 파일 읽기 실패: {}", path)),
        None => Ok(PipelineConfig::default()),
    }
}

fn open_model(config: &PipelineConfig) -> Result<SafetensorsModel> {
    let path = &config.paths.model_path;
    SafetensorsModel::open(path).with_context(|| format!("모델 열기 실패: {}", path.display()))
}

fn path_arg(matches: &ArgMatches, name: &str) -> Result<PathBuf> {
    matches
        .get_one::<String>(name)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("인자 누락: {}", name))
}

fn float_arg(matches: &ArgMatches, name: &str) -> Result<f64> {
    let raw = matches
        .get_one::<String>(name)
        .ok_or_else(|| anyhow!("인자 누락: {}", name))?;
    raw.parse().with_context(|| format!("{} 값이 숫자가 아님: {}", name, raw))
}

fn report(summary: ValidationSummary) -> Result<bool> {
    for failure in summary.failures() {
        println!("{}", failure);
    }
    println!("{}", summary.render());
    Ok(summary.all_passed())
}
