//! Shape checks applied to untyped peak input

use steptrace_core::{Axis, Direction, Dwell, Error, EventError, PeakEvent, RawPeak};

fn convert(raw: RawPeak) -> Result<PeakEvent, Error> {
    Ok(PeakEvent::try_from(raw)?)
}

#[test]
fn test_well_formed_motion_record() {
    let raw = RawPeak {
        direction: Some(-1),
        reversal: true,
        ..RawPeak::new(Axis::Z, 3.0)
    };
    let event = convert(raw).unwrap();
    assert_eq!(event.axis(), Axis::Z);
    assert_eq!(event.direction(), Some(Direction::Negative));
    assert!(event.is_reversal());
    assert_eq!(RawPeak::from(&event), raw);
}

#[test]
fn test_well_formed_dwell_record() {
    let raw = RawPeak {
        dwell_end: true,
        ..RawPeak::new(Axis::E, 3.0)
    };
    let event = convert(raw).unwrap();
    assert_eq!(event.dwell_marker(), Some(Dwell::End));
    assert_eq!(event.direction(), None);
    assert_eq!(RawPeak::from(&event), raw);
}

#[test]
fn test_every_malformed_shape_is_reported() {
    let cases = [
        RawPeak::new(Axis::X, 0.0),
        RawPeak {
            direction: Some(0),
            ..RawPeak::new(Axis::Y, 0.0)
        },
        RawPeak {
            direction: Some(1),
            dwell_start: true,
            ..RawPeak::new(Axis::X, 0.0)
        },
        RawPeak::new(Axis::E, 0.0),
        RawPeak {
            dwell_start: true,
            dwell_end: true,
            ..RawPeak::new(Axis::E, 0.0)
        },
        RawPeak {
            direction: Some(1),
            dwell_start: true,
            ..RawPeak::new(Axis::E, 0.0)
        },
        RawPeak {
            direction: Some(1),
            ..RawPeak::new(Axis::X, f64::INFINITY)
        },
    ];

    for raw in cases {
        let err = convert(raw).unwrap_err();
        assert!(err.is_malformed_event(), "{raw:?} gave {err}");
    }
}

#[test]
fn test_error_names_the_offending_record() {
    let err = PeakEvent::try_from(RawPeak {
        direction: Some(3),
        ..RawPeak::new(Axis::Y, 7.25)
    })
    .unwrap_err();

    assert_eq!(
        err,
        EventError::InvalidDirection {
            axis: Axis::Y,
            timestamp: 7.25,
            direction: 3
        }
    );
    assert!(err.to_string().contains("7.25"));
}
