// SuperTrend pipeline scenarios on hand-built daily series.
// Expected states were traced by hand through the band recurrence.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use etf_supertrend::config::SuperTrendConfig;
use etf_supertrend::market_data::{Bar, BarSeries};
use etf_supertrend::signals::{SignalDetector, SuperTrendSignalGenerator};
use etf_supertrend::supertrend::{Direction, Polarity, TrendClassifier};
use etf_supertrend::volatility::VolatilityEstimator;

use Direction::{Bearish, Bullish, Undefined};

fn day(i: usize) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_704_153_600, 0).unwrap() + Duration::days(i as i64)
}

fn series(symbol: &str, hlc: &[(f64, f64, f64)]) -> BarSeries {
    let bars = hlc
        .iter()
        .enumerate()
        .map(|(i, &(h, l, c))| Bar::new(day(i), h, l, c))
        .collect();
    BarSeries::new(symbol, bars)
}

fn generator(atr_length: usize, factor: f64, polarity: Polarity) -> SuperTrendSignalGenerator {
    SuperTrendSignalGenerator::new(SuperTrendConfig {
        atr_length,
        factor,
        polarity,
    })
    .unwrap()
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("value should be defined");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

/// Flat at 100 for bars 0-12, then a jump to 130 and a drop to 95.
fn flat_then_jump() -> BarSeries {
    let mut hlc = vec![(100.0, 100.0, 100.0); 13];
    hlc.push((130.0, 130.0, 130.0));
    hlc.push((95.0, 95.0, 95.0));
    series("XLP", &hlc)
}

/// Flip to bearish at index 5 and back to bullish at index 6 with atr_length 2.
fn engineered_flip() -> BarSeries {
    series(
        "XLV",
        &[
            (101.0, 99.0, 100.0),
            (101.0, 99.0, 100.0),
            (101.0, 99.0, 100.0), // atr 2, bands 94/106, first defined -> Bullish
            (101.0, 99.0, 90.0),  // 90 < 94 -> Bullish
            (91.0, 89.0, 80.0),   // bands 84/96, 80 < 84 -> Bullish
            (81.0, 79.0, 80.0),   // bands 74/86, 80 >= 74 -> Bearish
            (83.0, 79.0, 82.0),   // atr 3, bands 72/90, 82 <= 90 -> Bullish
            (70.0, 58.0, 60.0),   // atr 14, bands 22/106, 60 >= 22 -> Bearish
        ],
    )
}

#[test]
fn test_flat_series_volatility_and_states() -> Result<()> {
    let s = flat_then_jump();
    let analysis = generator(10, 3.0, Polarity::Inherited).analyze(&s)?;

    assert!(analysis.volatility[..10].iter().all(|v| v.is_none()));
    assert_close(analysis.volatility[10], 0.0);
    assert_close(analysis.volatility[12], 0.0);
    assert_close(analysis.volatility[13], 3.0);
    assert_close(analysis.volatility[14], 6.5);

    let directions: Vec<Direction> = analysis.states.iter().map(|s| s.direction).collect();
    let mut expected = vec![Undefined; 10];
    expected.extend([Bullish, Bearish, Bullish, Bearish, Bullish]);
    assert_eq!(directions, expected);

    // zero volatility collapses both bands onto the midpoint
    assert_close(analysis.states[10].trend_line, 100.0);
    assert_close(analysis.states[13].trend_line, 121.0);
    assert_close(analysis.states[14].trend_line, 114.5);

    // bearish at 13, bullish at 14: the inherited rule reports a buy on 95
    let signal = analysis.signal.expect("flip on the final pair");
    assert_eq!(signal.instrument, "XLP");
    assert_eq!(signal.price, 95.0);
    assert_eq!(signal.timestamp, day(14));
    Ok(())
}

#[test]
fn test_flat_series_conventional_polarity_has_no_signal() -> Result<()> {
    let s = flat_then_jump();
    let analysis = generator(10, 3.0, Polarity::Conventional).analyze(&s)?;

    assert!(analysis.states[10..].iter().all(|s| s.direction == Bullish));
    assert_close(analysis.states[14].trend_line, 75.5);
    assert!(analysis.signal.is_none());
    Ok(())
}

#[test]
fn test_engineered_flip_is_reported_only_at_its_index() -> Result<()> {
    let s = engineered_flip();
    let analysis = generator(2, 3.0, Polarity::Inherited).analyze(&s)?;

    let directions: Vec<Direction> = analysis.states.iter().map(|s| s.direction).collect();
    assert_eq!(
        directions,
        vec![Undefined, Undefined, Bullish, Bullish, Bullish, Bearish, Bullish, Bearish]
    );

    let detector = SignalDetector::new();
    let signal = detector
        .detect_at("XLV", &analysis.states, &s.bars, 6)
        .expect("flip at index 6");
    assert_eq!(signal.price, 82.0);
    assert_eq!(signal.timestamp, day(6));

    for index in (0..s.len()).filter(|&i| i != 6) {
        assert!(
            detector.detect_at("XLV", &analysis.states, &s.bars, index).is_none(),
            "unexpected signal at {}",
            index
        );
    }

    // the latest pair is bullish -> bearish
    assert!(analysis.signal.is_none());
    Ok(())
}

#[test]
fn test_engineered_flip_as_latest_bar() -> Result<()> {
    let mut s = engineered_flip();
    s.bars.truncate(7);
    let signal = generator(2, 3.0, Polarity::Inherited)
        .evaluate(&s)?
        .expect("flip on the latest bar");
    assert_eq!(signal.instrument, "XLV");
    assert_eq!(signal.price, 82.0);
    assert_eq!(signal.timestamp, day(6));
    Ok(())
}

#[test]
fn test_engineered_series_conventional_polarity() -> Result<()> {
    let s = engineered_flip();
    let analysis = generator(2, 3.0, Polarity::Conventional).analyze(&s)?;
    let directions: Vec<Direction> = analysis.states.iter().map(|s| s.direction).collect();
    assert_eq!(
        directions,
        vec![Undefined, Undefined, Bullish, Bearish, Bearish, Bearish, Bearish, Bearish]
    );
    assert!(analysis.signal.is_none());
    Ok(())
}

#[test]
fn test_short_series_never_signals() -> Result<()> {
    let generator = generator(10, 3.0, Polarity::Inherited);
    for len in 0..=10 {
        let hlc: Vec<(f64, f64, f64)> = (0..len)
            .map(|i| {
                let c = 100.0 + (i as f64) * 3.0;
                (c + 1.0, c - 1.0, c)
            })
            .collect();
        let analysis = generator.analyze(&series("XLB", &hlc))?;
        assert!(analysis.volatility.iter().all(|v| v.is_none()));
        assert!(analysis.states.iter().all(|s| s.direction == Undefined));
        assert!(analysis.signal.is_none());
    }
    Ok(())
}

#[test]
fn test_exact_upper_band_touch_resolves_to_not_greater() -> Result<()> {
    // atr_length 2, factor 1: bar 2 has atr 2 and bands 98/102 around 100
    // bar 3 keeps atr 2 and closes exactly on its upper band (102)
    let s = series(
        "XLC",
        &[
            (101.0, 99.0, 100.0),
            (101.0, 99.0, 100.0),
            (101.0, 99.0, 100.0),
            (101.0, 99.0, 102.0),
        ],
    );
    let estimator = VolatilityEstimator::new(2)?;
    let volatility = estimator.estimate(&s.bars);
    assert_close(volatility[3], 2.0);

    // drive bar 3 from a bearish previous state
    let classifier = TrendClassifier::new(1.0, Polarity::Inherited)?;
    let state = classifier.step(Bearish, &s.bars[3], 2.0);
    assert_eq!(state.direction, Bullish);

    let classifier = TrendClassifier::new(1.0, Polarity::Conventional)?;
    let state = classifier.step(Bearish, &s.bars[3], 2.0);
    assert_eq!(state.direction, Bearish);
    Ok(())
}
