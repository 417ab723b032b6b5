//! Analysis pipeline integration tests.
//!
//! Synthetic signals with a known pitch stand in for recorded speech; the
//! estimators are judged against that ground truth on interior frames
//! (frames near the edges see a window running off the signal and are
//! allowed to disagree).

mod helpers;

use canto::prelude::*;
use helpers::tolerances::*;
use helpers::*;

/// Interior frame range of a contour: skips 10 frames at each edge.
fn interior(frames: usize) -> std::ops::Range<usize> {
    10..frames.saturating_sub(10)
}

#[test]
fn test_fast_method_tracks_pulse_train() {
    let engine = test_engine_with_method(F0Method::Fast);
    let x = pulse_train(150.0, TEST_SAMPLE_RATE, 1.0);

    let contour = engine.estimate_f0(&x, TEST_SAMPLE_RATE).unwrap();
    assert!(contour.frames() > 100);

    for i in interior(contour.frames()) {
        assert!(contour.vuv[i], "frame {} should be voiced", i);
        assert!(
            (contour.f0[i] - 150.0).abs() < F0_TOLERANCE_HZ,
            "frame {}: f0 {}",
            i,
            contour.f0[i]
        );
    }
}

#[test]
fn test_robust_method_tracks_pulse_train() {
    let engine = test_engine_with_method(F0Method::Robust);
    let x = pulse_train(150.0, TEST_SAMPLE_RATE, 1.0);

    let contour = engine.estimate_f0(&x, TEST_SAMPLE_RATE).unwrap();
    for i in interior(contour.frames()) {
        assert!(contour.vuv[i], "frame {} should be voiced", i);
        assert!(
            (contour.f0[i] - 150.0).abs() < F0_TOLERANCE_HZ,
            "frame {}: f0 {}",
            i,
            contour.f0[i]
        );
    }
}

#[test]
fn test_fast_method_tracks_pure_sine() {
    let engine = test_engine_with_method(F0Method::Fast);
    let x = sine(220.0, TEST_SAMPLE_RATE, 1.0);

    let contour = engine.estimate_f0(&x, TEST_SAMPLE_RATE).unwrap();
    for i in interior(contour.frames()) {
        assert!(contour.vuv[i], "frame {} should be voiced", i);
        assert!(
            (contour.f0[i] - 220.0).abs() < F0_TOLERANCE_HZ,
            "frame {}: f0 {}",
            i,
            contour.f0[i]
        );
    }
}

#[test]
fn test_silence_is_unvoiced() {
    let x = silence(TEST_SAMPLE_RATE, 1.0);
    for method in [F0Method::Fast, F0Method::Robust] {
        let engine = test_engine_with_method(method);
        let contour = engine.estimate_f0(&x, TEST_SAMPLE_RATE).unwrap();
        for i in 0..contour.frames() {
            assert!(!contour.vuv[i], "{:?} frame {} voiced in silence", method, i);
            assert_eq!(contour.f0[i], 0.0);
        }
    }
}

#[test]
fn test_voicing_transition_on_half_silent_signal() {
    let engine = test_engine();
    let mut x = pulse_train(150.0, TEST_SAMPLE_RATE, 0.5);
    x.extend(silence(TEST_SAMPLE_RATE, 0.5));

    let contour = engine.estimate_f0(&x, TEST_SAMPLE_RATE).unwrap();
    let frames = contour.frames();
    // First quarter voiced, last quarter unvoiced; the transition region in
    // between is left to the estimator.
    let voiced_head = voiced_ratio(&contour.vuv[..frames / 4]);
    let voiced_tail = voiced_ratio(&contour.vuv[3 * frames / 4..]);
    assert!(voiced_head > 0.8, "head voiced ratio {}", voiced_head);
    assert!(voiced_tail < 0.2, "tail voiced ratio {}", voiced_tail);
}

#[test]
fn test_analyze_produces_consistent_bundle() {
    let engine = test_engine();
    let x = pulse_train(200.0, TEST_SAMPLE_RATE, 1.0);

    let bundle = engine.analyze(&x, TEST_SAMPLE_RATE).unwrap();
    assert_eq!(bundle.sample_rate(), TEST_SAMPLE_RATE);
    assert_eq!(bundle.fft_size(), 1024);
    assert_eq!(bundle.bins(), 513);
    assert!(bundle.ps_spectrogram().is_some());

    let frames = bundle.frames();
    assert_eq!(bundle.f0().len(), frames);
    assert_eq!(bundle.spectrogram().len(), frames);
    assert_eq!(bundle.aperiodicity().len(), frames);

    for i in 0..frames {
        assert_eq!(bundle.f0()[i] == 0.0, !bundle.vuv()[i]);
        assert!(bundle.spectrogram()[i].iter().all(|&p| p > 0.0));
        assert!(bundle.aperiodicity()[i]
            .iter()
            .all(|&a| (0.0..=1.0).contains(&a)));
    }
}

#[test]
fn test_aperiodicity_low_for_clean_harmonic_signal() {
    let engine = test_engine();
    let x = pulse_train(200.0, TEST_SAMPLE_RATE, 1.0);
    let bundle = engine.analyze(&x, TEST_SAMPLE_RATE).unwrap();

    // A band-limited pulse train is fully periodic: the low band of interior
    // voiced frames should be dominated by harmonic energy.
    for i in interior(bundle.frames()) {
        if !bundle.vuv()[i] {
            continue;
        }
        let low_band_mean: f64 =
            bundle.aperiodicity()[i][..64].iter().sum::<f64>() / 64.0;
        assert!(
            low_band_mean < 0.5,
            "frame {}: low-band aperiodicity {}",
            i,
            low_band_mean
        );
    }
}

#[test]
fn test_envelope_concentrates_energy_at_tone() {
    let engine = test_engine();
    let x = sine(200.0, TEST_SAMPLE_RATE, 1.0);
    let spectrum = engine.estimate_spectrum(&x, TEST_SAMPLE_RATE).unwrap();

    let bin_hz = TEST_SAMPLE_RATE as f64 / spectrum.fft_size as f64;
    let row = &spectrum.spectrogram[spectrum.spectrogram.len() / 2];
    let peak_bin = row
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(k, _)| k)
        .unwrap();
    let peak_freq = peak_bin as f64 * bin_hz;
    assert!(
        (peak_freq - 200.0).abs() < 100.0,
        "envelope peak at {} Hz",
        peak_freq
    );
}

#[test]
fn test_method_parsing() {
    assert_eq!("fast".parse::<F0Method>().unwrap(), F0Method::Fast);
    assert_eq!("robust".parse::<F0Method>().unwrap(), F0Method::Robust);
    assert!(matches!(
        "harvest".parse::<F0Method>().unwrap_err(),
        Error::InvalidMethod(_)
    ));
}

#[test]
fn test_too_short_signal_rejected() {
    let engine = test_engine();
    let err = engine
        .estimate_f0(&[0.0; 16], TEST_SAMPLE_RATE)
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientData { .. }));
}

#[test]
fn test_custom_pitch_range_is_honored() {
    // A 100 Hz pulse train is outside a 150-400 Hz search range; the
    // estimator must not report a value below the floor.
    let engine = CantoEngine::builder()
        .f0_floor(150.0)
        .f0_ceil(400.0)
        .build()
        .unwrap();
    let x = pulse_train(200.0, TEST_SAMPLE_RATE, 1.0);
    let contour = engine.estimate_f0(&x, TEST_SAMPLE_RATE).unwrap();
    for i in interior(contour.frames()) {
        if contour.vuv[i] {
            assert!(contour.f0[i] >= 150.0 - F0_TOLERANCE_HZ);
            assert!(contour.f0[i] <= 400.0 + F0_TOLERANCE_HZ);
        }
    }
}
