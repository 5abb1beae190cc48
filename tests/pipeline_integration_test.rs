// 流水线端到端集成测试
//
// 测试流程：
// 1. 从不同数据源构造流水线 (数组、range、repeat、多源组合)
// 2. 串联多级惰性算子
// 3. 验证拉取次数与结果
// 4. 统计终结算子与描述性统计

use qastream::utils::logging::init_test_logger;
use qastream::{chain, interleave, merge, merge_by, range, repeat, seq, zip, zip_with};
use qastream::{SeqError, StatsConfig, VarianceKind};
use std::cell::Cell;

/// 模拟行情收盘价
fn closes() -> Vec<f64> {
    vec![
        3520.0, 3531.5, 3528.0, 3540.5, 3555.0, 3549.5, 3562.0, 3570.5, 3566.0, 3580.0,
    ]
}

#[test]
fn test_multi_stage_pipeline_pulls_each_element_once() {
    init_test_logger();

    let pulled = Cell::new(0);
    let windows = seq(closes())
        .tap(|_| pulled.set(pulled.get() + 1))
        .pairwise()
        .map(|(prev, next)| next - prev)
        .window(3)
        .unwrap()
        .map(|w| w.iter().sum::<f64>())
        .to_vec();

    assert_eq!(pulled.get(), closes().len());
    // 9 个差分, 窗口 3 -> 7 个输出
    assert_eq!(windows.len(), 7);
    assert!((windows[0] - 20.5).abs() < 1e-9);
}

#[test]
fn test_validation_happens_before_any_pull() {
    let pulled = Cell::new(0);
    let source = seq(0..10).tap(|_| pulled.set(pulled.get() + 1));
    assert!(matches!(source.window(0), Err(SeqError::Validation(_))));
    assert_eq!(pulled.get(), 0);

    assert!(seq(0..10).chunk(0).is_err());
    assert!(seq([1.0]).ewma(0.0).is_err());
    assert!(seq([1.0]).ewma(1.5).is_err());
    assert!(range(0, 10, 0).is_err());
    assert!(seq([1.0, 2.0]).percentile(101.0).is_err());

    let pulled = Cell::new(0);
    let rank = seq(0..1000)
        .tap(|_| pulled.set(pulled.get() + 1))
        .percentile(101.0);
    assert!(matches!(rank, Err(SeqError::Validation(_))));
    assert_eq!(pulled.get(), 0);

    // 无限源上的非法百分位立即返回
    assert!(repeat(1.0, None).percentile(-1.0).is_err());
}

#[test]
fn test_range_and_repeat_sources() {
    assert_eq!(range(0, 10, 3).unwrap().to_vec(), vec![0, 3, 6, 9]);
    assert_eq!(range(5, 0, -2).unwrap().to_vec(), vec![5, 3, 1]);
    assert!(range(0, 5, -1).unwrap().is_empty());
    assert_eq!(repeat("x", Some(3)).to_vec(), vec!["x", "x", "x"]);
    assert_eq!(repeat(7, None).take(2).sum(), Some(14));
}

#[test]
fn test_take_then_drop_on_same_construction_is_empty() {
    let mut pipeline = seq(1..=8);
    let head = pipeline.by_ref().take(3).to_vec();
    assert_eq!(head, vec![1, 2, 3]);
    assert_eq!(pipeline.by_ref().drop(5).to_vec(), Vec::<i32>::new());
    assert!(pipeline.is_empty());
}

#[test]
fn test_ohlc_style_aggregation() {
    // 以 5 根为一组聚合高低点
    let bars: Vec<(f64, f64)> = seq(closes())
        .chunk(5)
        .unwrap()
        .map(|c| {
            let hi = seq(c.iter().copied()).max().unwrap_or(f64::NAN);
            let lo = seq(c.iter().copied()).min().unwrap_or(f64::NAN);
            (hi, lo)
        })
        .to_vec();
    assert_eq!(bars, vec![(3555.0, 3520.0), (3580.0, 3549.5)]);
}

#[test]
fn test_combinators_end_to_end() {
    let spreads = zip_with(vec![10.0, 11.0, 12.0], vec![9.5, 10.0], |a, b| a - b).to_vec();
    assert_eq!(spreads, vec![0.5, 1.0]);

    let pairs = zip(1..=3, "abc".chars()).to_vec();
    assert_eq!(pairs, vec![(1, 'a'), (2, 'b'), (3, 'c')]);

    let all = chain(vec![vec![1, 2], vec![], vec![3]]).to_vec();
    assert_eq!(all, vec![1, 2, 3]);

    let rr = interleave(vec![vec![1, 4, 7], vec![2, 5], vec![3]]).to_vec();
    assert_eq!(rr, vec![1, 2, 3, 4, 5, 7]);

    assert_eq!(
        merge(vec![vec![1, 3, 5], vec![2, 4, 6]]).to_vec(),
        vec![1, 2, 3, 4, 5, 6]
    );

    let desc = merge_by(vec![vec![9, 4, 1], vec![8, 8, 2]], |a: &i32, b: &i32| b.cmp(a)).to_vec();
    assert_eq!(desc, vec![9, 8, 8, 4, 2, 1]);
}

#[test]
fn test_group_by_and_sort() {
    let trades = vec![("rb", 3), ("au", 1), ("rb", 2), ("cu", 5), ("au", 4)];
    let groups = seq(trades.clone()).group_by(|(code, _)| *code);
    let codes: Vec<&str> = groups.iter().map(|(k, _)| *k).collect();
    assert_eq!(codes, vec!["rb", "au", "cu"]);
    assert_eq!(groups[0].1, vec![("rb", 3), ("rb", 2)]);

    let by_volume = seq(trades).sort_by_key(|(_, v)| *v).map(|(_, v)| v).to_vec();
    assert_eq!(by_volume, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_median_examples() {
    assert_eq!(seq([1, 2, 3, 4]).median(), Some(2.5));
    assert_eq!(seq([1, 3, 2]).median(), Some(2.0));
    assert_eq!(seq(Vec::<i32>::new()).median(), None);
}

#[test]
fn test_correlation_examples() {
    let up = seq([1, 2, 3, 4, 5]).correlation([2, 4, 6, 8, 10]).unwrap();
    let down = seq([1, 2, 3, 4, 5]).correlation([5, 4, 3, 2, 1]).unwrap();
    assert!((up - 1.0).abs() < 1e-12);
    assert!((down + 1.0).abs() < 1e-12);
    assert_eq!(seq([1, 2, 3, 4, 5]).correlation([3, 3, 3, 3, 3]), None);
}

#[test]
fn test_z_score_with_config() {
    let scores = seq([1.0, 2.0, 3.0, 4.0]).streaming_z_score().to_vec();
    assert!(scores[0].is_nan() && scores[1].is_nan());
    // 前两个点均值 1.5, 总体标准差 0.5
    assert!((scores[2] - 3.0).abs() < 1e-12);

    let config = StatsConfig {
        z_score_warmup: 3,
        ..StatsConfig::default()
    };
    let scores = seq([1.0, 2.0, 3.0, 4.0]).streaming_z_score_with(&config).to_vec();
    assert!(scores[2].is_nan());
    assert!(scores[3].is_finite());
}

#[test]
fn test_describe_with_sample_variance() {
    let config = StatsConfig::from_toml_str(
        r#"
variance = "sample"
percentile_precision = 2
"#,
    )
    .unwrap();
    assert_eq!(config.variance, VarianceKind::Sample);

    let summary = seq([2, 4, 4, 4, 5, 5, 7, 9]).describe_with(&config).unwrap();
    assert_eq!(summary.count, 8);
    assert_eq!(summary.min, 2.0);
    assert_eq!(summary.max, 9.0);
    assert_eq!(summary.median, 4.5);
    assert!((summary.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-9);

    let json = summary.to_json().unwrap();
    assert_eq!(json["count"], 8);
}

#[test]
fn test_numeric_coercion_of_mixed_input() {
    let values = vec![
        serde_json::json!(1.5),
        serde_json::json!("2.5"),
        serde_json::json!(3),
    ];
    let parsed = seq(values).numeric().try_to_vec().unwrap();
    assert_eq!(parsed, vec![1.5, 2.5, 3.0]);

    let bad = seq(vec![serde_json::json!({"px": 1})]).numeric().try_to_vec();
    assert!(matches!(bad, Err(SeqError::TypeConversion(_))));
}
