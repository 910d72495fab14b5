// The process-wide latches are statics, this file holds a single test so
// nothing else in the test binary touches them.

mod common;

use common::{FakeAnalog, FakeRegs, Op, SPARE, count, log};
use stm32f2xx_vbat::{
    Config, Priming, Reader, Sensor,
    latch::{TEMP_PRIMED, VBAT_PRIMED},
};

#[test]
fn readers_share_priming() {
    let cfg: Config = Config::new().set_priming(Priming::ProcessWide);
    let log = log();
    let mut analog = FakeAnalog::new(&log);
    let mut a = Reader::new(FakeRegs::new(&log, 943), SPARE, cfg);
    let mut b = Reader::new(FakeRegs::new(&log, 943), SPARE, cfg);

    assert!(!VBAT_PRIMED.is_set());
    assert!(!TEMP_PRIMED.is_set());

    a.vbat(&mut analog).unwrap();
    assert!(VBAT_PRIMED.is_set());
    assert!(b.is_primed(Sensor::Vbat));
    assert!(!b.is_primed(Sensor::Temp));

    b.vbat(&mut analog).unwrap();
    b.temperature(&mut analog).unwrap();
    a.temperature(&mut analog).unwrap();

    assert_eq!(count(&log, Op::Vbat(true)), 1);
    assert_eq!(count(&log, Op::TsVref(true)), 1);
    assert!(TEMP_PRIMED.is_set());
}
