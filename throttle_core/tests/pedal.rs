use rstest::rstest;
use throttle_core::mocks::DeadAdc;
use throttle_core::{
    FaultPolicy, PedalCfg, ReductionKind, SampleOutcome, SensorCalibration, ThrottleError,
    ThrottlePedal,
};
use throttle_hardware::{AdcStatus, SimulatedAdc};

const EPS: f32 = 1e-5;

// Reference sensors: raw 2 -> 15.0 deg on ch0 (0.5), 12.5 deg on ch1 (0.41667)
const POS_CH0_RAW2: f32 = 0.5;
const POS_CH1_RAW2: f32 = 12.5 / 30.0;

fn reference_pedal(adc: &SimulatedAdc) -> ThrottlePedal<SimulatedAdc> {
    ThrottlePedal::builder()
        .with_adc(adc.clone())
        .build()
        .expect("reference pedal builds")
}

fn inject_both(adc: &SimulatedAdc, raw: u32) {
    adc.set_injected_output(0, raw, AdcStatus::Ok).unwrap();
    adc.set_injected_output(1, raw, AdcStatus::Ok).unwrap();
}

#[rstest]
fn build_initializes_every_channel() {
    let adc = SimulatedAdc::new(2);
    let pedal = reference_pedal(&adc);
    assert!(adc.is_initialized(0));
    assert!(adc.is_initialized(1));
    assert_eq!(pedal.sensors().len(), 2);
    assert_eq!(pedal.position(), 0.0);
}

#[rstest]
fn invalid_channel_is_fatal_at_build() {
    let adc = SimulatedAdc::new(2);
    let err = ThrottlePedal::builder()
        .with_adc(adc)
        .with_sensors([
            SensorCalibration::new(0, 0.5, 0.1),
            SensorCalibration::new(5, 1.0, 0.08),
        ])
        .build()
        .expect_err("channel 5 does not exist");
    match err.downcast_ref::<ThrottleError>() {
        Some(ThrottleError::ChannelInit { channel, .. }) => assert_eq!(*channel, 5),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
fn dead_adc_fails_on_first_channel() {
    let err = ThrottlePedal::builder().with_adc(DeadAdc).build().unwrap_err();
    assert!(err.to_string().contains("channel 0"), "{err}");
}

#[rstest]
#[case(PedalCfg { window: 0, ..PedalCfg::default() })]
#[case(PedalCfg { max_angle: 0.0, ..PedalCfg::default() })]
#[case(PedalCfg { max_angle: f32::NAN, ..PedalCfg::default() })]
fn rejects_invalid_pedal_cfg(#[case] cfg: PedalCfg) {
    let result = ThrottlePedal::builder()
        .with_adc(SimulatedAdc::new(2))
        .with_pedal_cfg(cfg)
        .build();
    assert!(result.is_err());
}

#[rstest]
fn empty_sensor_list_is_rejected() {
    let result = ThrottlePedal::builder()
        .with_adc(SimulatedAdc::new(2))
        .with_sensors([])
        .build();
    assert!(result.is_err());
}

#[rstest]
fn warm_up_averages_in_zeros() {
    let adc = SimulatedAdc::new(2);
    let mut pedal = reference_pedal(&adc);
    inject_both(&adc, 2);

    assert!(pedal.update_cycle());
    let s0 = pedal.sensor(0).unwrap().average();
    assert!((s0 - POS_CH0_RAW2 / 5.0).abs() < EPS, "{s0}");

    for _ in 0..4 {
        assert!(pedal.update_cycle());
    }
    let expected = (POS_CH0_RAW2 + POS_CH1_RAW2) / 2.0;
    assert!((pedal.position() - expected).abs() < EPS);
}

#[rstest]
fn single_sensor_fault_drags_its_average_toward_zero() {
    let adc = SimulatedAdc::new(2);
    let mut pedal = reference_pedal(&adc);
    inject_both(&adc, 2);
    for _ in 0..5 {
        assert!(pedal.update_cycle());
    }

    adc.set_injected_output(1, 2, AdcStatus::Nok).unwrap();
    assert!(!pedal.update_cycle());

    let faulty = pedal.sensor(1).unwrap();
    assert_eq!(faulty.window().latest(), 0.0);
    assert_eq!(faulty.last_outcome(), SampleOutcome::ReadFailed);
    let s1 = faulty.average();
    assert!((s1 - POS_CH1_RAW2 * 4.0 / 5.0).abs() < EPS);

    let s0 = pedal.sensor(0).unwrap().average();
    assert!((s0 - POS_CH0_RAW2).abs() < EPS);
    assert!((pedal.position() - (s0 + s1) / 2.0).abs() < EPS);
}

#[rstest]
fn later_channels_are_sampled_after_an_earlier_failure() {
    let adc = SimulatedAdc::new(2);
    let mut pedal = reference_pedal(&adc);
    adc.set_injected_output(0, 2, AdcStatus::Nok).unwrap();
    adc.set_injected_output(1, 2, AdcStatus::Ok).unwrap();

    assert!(!pedal.update_cycle());
    assert_eq!(adc.read_count(0), 1);
    assert_eq!(adc.read_count(1), 1);
    assert!((pedal.sensor(1).unwrap().window().latest() - POS_CH1_RAW2).abs() < EPS);
}

#[rstest]
fn default_raw_zero_is_out_of_range_on_channel_zero() {
    // (0 - 0.5) / 0.1 = -5 deg
    let adc = SimulatedAdc::new(2);
    let mut pedal = reference_pedal(&adc);
    assert!(!pedal.update_cycle());
    assert!(matches!(
        pedal.sensor(0).unwrap().last_outcome(),
        SampleOutcome::OutOfRange { raw: 0, .. }
    ));
}

#[rstest]
fn hold_last_good_policy_keeps_average_steady() {
    let adc = SimulatedAdc::new(2);
    let mut pedal = ThrottlePedal::builder()
        .with_adc(adc.clone())
        .with_pedal_cfg(PedalCfg {
            fault_policy: FaultPolicy::HoldLastGood,
            ..PedalCfg::default()
        })
        .build()
        .unwrap();
    inject_both(&adc, 2);
    for _ in 0..5 {
        pedal.update_cycle();
    }
    let before = pedal.position();
    adc.set_injected_output(1, 2, AdcStatus::Nok).unwrap();
    assert!(!pedal.update_cycle());
    assert!((pedal.position() - before).abs() < EPS);
}

#[rstest]
fn vote_reducer_flags_disagreeing_sensors() {
    let adc = SimulatedAdc::new(2);
    let mut pedal = ThrottlePedal::builder()
        .with_adc(adc.clone())
        .with_reduction(ReductionKind::Vote { threshold: 0.05 })
        .build()
        .unwrap();
    // ch0 raw 3 -> 25 deg (0.833), ch1 raw 1 -> 0 deg (0.0)
    adc.set_injected_output(0, 3, AdcStatus::Ok).unwrap();
    adc.set_injected_output(1, 1, AdcStatus::Ok).unwrap();
    for _ in 0..5 {
        assert!(pedal.update_cycle());
    }
    assert!(!pedal.sensors_consistent());

    let averaged = ThrottlePedal::builder()
        .with_adc(SimulatedAdc::new(2))
        .build()
        .unwrap();
    assert!(averaged.sensors_consistent());
}

#[rstest]
fn average_is_idempotent() {
    let adc = SimulatedAdc::new(2);
    let mut pedal = reference_pedal(&adc);
    inject_both(&adc, 3);
    pedal.update_cycle();
    let a = pedal.position();
    let b = pedal.position();
    assert_eq!(a, b);
    assert_eq!(pedal.sensor(0).unwrap().average(), pedal.sensor(0).unwrap().average());
}
