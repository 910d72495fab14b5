mod common;

use common::{FakeAnalog, FakeRegs, Op, SPARE, count, log, ops, read_ops};
use stm32f2xx_vbat::{Config, Reader, Sensor, adc::Ch};

#[test]
fn first_vbat_read_primes() {
    let log = log();
    let mut analog = FakeAnalog::new(&log);
    let mut reader = Reader::new(FakeRegs::new(&log, 10), SPARE, Config::new());
    assert!(!reader.is_primed(Sensor::Vbat));

    reader.vbat(&mut analog).unwrap();
    assert!(reader.is_primed(Sensor::Vbat));

    let mut expected: Vec<Op> = vec![Op::Analog(SPARE), Op::Vbat(true)];
    expected.extend(read_ops(Ch::Vbat, 10));
    assert_eq!(ops(&log), expected);
}

#[test]
fn second_vbat_read_does_not_prime() {
    let log = log();
    let mut analog = FakeAnalog::new(&log);
    let mut reader = Reader::new(FakeRegs::new(&log, 10), SPARE, Config::new());

    reader.vbat(&mut analog).unwrap();
    log.borrow_mut().clear();
    reader.vbat(&mut analog).unwrap();

    assert_eq!(ops(&log), read_ops(Ch::Vbat, 10));
}

#[test]
fn enable_called_once_per_kind() {
    let log = log();
    let mut analog = FakeAnalog::new(&log);
    let mut reader = Reader::new(FakeRegs::new(&log, 900), SPARE, Config::new());

    for _ in 0..3 {
        reader.vbat(&mut analog).unwrap();
        reader.temperature(&mut analog).unwrap();
    }

    assert_eq!(count(&log, Op::Vbat(true)), 1);
    assert_eq!(count(&log, Op::TsVref(true)), 1);
    assert_eq!(count(&log, Op::Vbat(false)), 0);
    assert_eq!(count(&log, Op::TsVref(false)), 0);
    // one cache-bust per read plus one priming read per kind
    assert_eq!(count(&log, Op::Analog(SPARE)), 6 + 2);
}

#[test]
fn temperature_latch_is_independent() {
    let log = log();
    let mut analog = FakeAnalog::new(&log);
    let mut reader = Reader::new(FakeRegs::new(&log, 943), SPARE, Config::new());

    reader.vbat(&mut analog).unwrap();
    assert!(!reader.is_primed(Sensor::Temp));
    log.borrow_mut().clear();

    reader.temperature(&mut analog).unwrap();
    let mut expected: Vec<Op> = vec![Op::Analog(SPARE), Op::TsVref(true)];
    expected.extend(read_ops(Ch::Vts, 943));
    assert_eq!(ops(&log), expected);
}

#[test]
fn raw_channel_read_does_not_prime() {
    let log = log();
    let mut analog = FakeAnalog::new(&log);
    let mut reader = Reader::new(FakeRegs::new(&log, 1), SPARE, Config::new());

    reader.read_channel(&mut analog, Ch::Vbat).unwrap();
    assert!(!reader.is_primed(Sensor::Vbat));
    assert_eq!(count(&log, Op::Vbat(true)), 0);
}

#[test]
fn readers_prime_independently() {
    let log = log();
    let mut analog = FakeAnalog::new(&log);
    let mut a = Reader::new(FakeRegs::new(&log, 1), SPARE, Config::new());
    let mut b = Reader::new(FakeRegs::new(&log, 1), SPARE, Config::new());

    a.vbat(&mut analog).unwrap();
    b.vbat(&mut analog).unwrap();
    a.vbat(&mut analog).unwrap();

    assert_eq!(count(&log, Op::Vbat(true)), 2);
}

#[test]
fn failed_spare_read_is_not_fatal() {
    let log = log();
    let mut analog = FakeAnalog::failing(&log);
    let mut reader = Reader::new(FakeRegs::new(&log, 943), SPARE, Config::new());

    assert_eq!(reader.temperature(&mut analog), Ok(25.0));
    assert_eq!(count(&log, Op::Analog(SPARE)), 2);
}
