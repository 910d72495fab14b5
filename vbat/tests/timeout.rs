mod common;

use core::num::NonZeroU32;

use common::{FakeAnalog, FakeRegs, Op, SPARE, claim_ops, count, log, ops, restore_ops};
use stm32f2xx_vbat::{
    Config, Error, Poll, Reader,
    adc::{Ch, SampleTime},
};

const LIMIT: u32 = 16;

fn bounded() -> Config {
    Config::new().set_poll(Poll::Bounded(NonZeroU32::new(LIMIT).unwrap()))
}

#[test]
fn stuck_adc_times_out() {
    let log = log();
    let mut analog = FakeAnalog::new(&log);
    let regs = FakeRegs::new(&log, 0).eoc_on(None);
    let mut reader = Reader::new(regs, SPARE, bounded());

    assert_eq!(reader.read_channel(&mut analog, Ch::Vbat), Err(Error::Timeout));

    let mut expected: Vec<Op> = claim_ops();
    expected.extend([
        Op::Channel(Ch::Vbat, 1, SampleTime::Cyc480),
        Op::Enable(true),
        Op::Start,
    ]);
    expected.extend((0..LIMIT).map(|_| Op::Eoc(false)));
    expected.push(Op::Enable(false));
    expected.extend(restore_ops());
    assert_eq!(ops(&log), expected);
}

#[test]
fn timeout_propagates_from_measurements() {
    let log = log();
    let mut analog = FakeAnalog::new(&log);
    let regs = FakeRegs::new(&log, 0).eoc_on(None);
    let mut reader = Reader::new(regs, SPARE, bounded());

    assert_eq!(reader.vbat(&mut analog), Err(Error::Timeout));
    assert_eq!(reader.temperature(&mut analog), Err(Error::Timeout));
    assert_eq!(count(&log, Op::ClearEoc), 0);
    assert_eq!(count(&log, Op::Data(0)), 0);
}

#[test]
fn conversion_within_limit() {
    let log = log();
    let mut analog = FakeAnalog::new(&log);
    let regs = FakeRegs::new(&log, 321).eoc_on(Some(LIMIT));
    let mut reader = Reader::new(regs, SPARE, bounded());

    assert_eq!(reader.read_channel(&mut analog, Ch::Vts), Ok(321));
    assert_eq!(count(&log, Op::Eoc(false)), LIMIT as usize - 1);
    assert_eq!(count(&log, Op::ClearEoc), 1);
}

#[test]
fn one_past_limit() {
    let log = log();
    let mut analog = FakeAnalog::new(&log);
    let regs = FakeRegs::new(&log, 321).eoc_on(Some(LIMIT + 1));
    let mut reader = Reader::new(regs, SPARE, bounded());

    assert_eq!(reader.read_channel(&mut analog, Ch::Vts), Err(Error::Timeout));
}

#[test]
fn forever_waits() {
    let log = log();
    let mut analog = FakeAnalog::new(&log);
    let regs = FakeRegs::new(&log, 5).eoc_on(Some(10_000));
    let mut reader = Reader::new(regs, SPARE, Config::new());

    assert_eq!(reader.read_channel(&mut analog, Ch::Vbat), Ok(5));
    assert_eq!(count(&log, Op::Eoc(false)), 9_999);
}
