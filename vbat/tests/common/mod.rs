#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};
use stm32f2xx_vbat::{
    AdcRegs, AnalogRead,
    adc::{Ch, CommonInit, Init, STM32F2XX, SampleTime, Unit},
};

pub const SPARE: u8 = 7;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Op {
    Clock,
    Common(CommonInit),
    Init(Unit, Init),
    Channel(Ch, u8, SampleTime),
    Enable(bool),
    Start,
    Eoc(bool),
    Data(u16),
    ClearEoc,
    Vbat(bool),
    TsVref(bool),
    Analog(u8),
}

pub type Log = Rc<RefCell<Vec<Op>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn ops(log: &Log) -> Vec<Op> {
    log.borrow().clone()
}

pub fn count(log: &Log, op: Op) -> usize {
    log.borrow().iter().filter(|&&o| o == op).count()
}

/// Records every register operation.
#[derive(Debug)]
pub struct FakeRegs {
    log: Log,
    data: u16,
    /// EOC reads true on this poll after a start, `None` for never.
    eoc_on: Option<u32>,
    polls: u32,
}

impl FakeRegs {
    pub fn new(log: &Log, data: u16) -> Self {
        Self {
            log: log.clone(),
            data,
            eoc_on: Some(1),
            polls: 0,
        }
    }

    pub fn eoc_on(mut self, poll: Option<u32>) -> Self {
        self.eoc_on = poll;
        self
    }

    pub fn set_data(&mut self, data: u16) {
        self.data = data;
    }

    fn push(&self, op: Op) {
        self.log.borrow_mut().push(op)
    }
}

impl AdcRegs for FakeRegs {
    fn enable_clock(&mut self) {
        self.push(Op::Clock)
    }

    fn common_init(&mut self, init: &CommonInit) {
        self.push(Op::Common(*init))
    }

    fn init(&mut self, unit: Unit, init: &Init) {
        self.push(Op::Init(unit, *init))
    }

    fn regular_channel(&mut self, ch: Ch, rank: u8, ts: SampleTime) {
        self.push(Op::Channel(ch, rank, ts))
    }

    fn set_enabled(&mut self, en: bool) {
        self.push(Op::Enable(en))
    }

    fn start(&mut self) {
        self.polls = 0;
        self.push(Op::Start)
    }

    fn eoc(&mut self) -> bool {
        self.polls += 1;
        let eoc: bool = self.eoc_on.is_some_and(|n| self.polls >= n);
        self.push(Op::Eoc(eoc));
        eoc
    }

    fn data(&mut self) -> u16 {
        self.push(Op::Data(self.data));
        self.data
    }

    fn clear_eoc(&mut self) {
        self.push(Op::ClearEoc)
    }

    fn set_vbat(&mut self, en: bool) {
        self.push(Op::Vbat(en))
    }

    fn set_tsvref(&mut self, en: bool) {
        self.push(Op::TsVref(en))
    }
}

/// The platform's generic analog read.
#[derive(Debug)]
pub struct FakeAnalog {
    log: Log,
    fail: bool,
}

impl FakeAnalog {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            fail: false,
        }
    }

    pub fn failing(log: &Log) -> Self {
        Self {
            log: log.clone(),
            fail: true,
        }
    }
}

impl AnalogRead<u8> for FakeAnalog {
    type Error = ();

    fn analog_read(&mut self, pin: &mut u8) -> Result<u16, ()> {
        self.log.borrow_mut().push(Op::Analog(*pin));
        if self.fail { Err(()) } else { Ok(0x800) }
    }
}

pub fn claim_ops() -> Vec<Op> {
    vec![
        Op::Clock,
        Op::Common(STM32F2XX.claim_common),
        Op::Init(Unit::Adc1, STM32F2XX.claim),
        Op::Init(Unit::Adc2, STM32F2XX.claim),
    ]
}

pub fn restore_ops() -> Vec<Op> {
    vec![
        Op::Common(STM32F2XX.platform_common),
        Op::Init(Unit::Adc1, STM32F2XX.platform),
        Op::Init(Unit::Adc2, STM32F2XX.platform),
        Op::Analog(SPARE),
    ]
}

/// Complete claim, single poll conversion, restore sequence.
pub fn read_ops(ch: Ch, data: u16) -> Vec<Op> {
    let mut ops: Vec<Op> = claim_ops();
    ops.extend([
        Op::Channel(ch, 1, SampleTime::Cyc480),
        Op::Enable(true),
        Op::Start,
        Op::Eoc(true),
        Op::Data(data),
        Op::ClearEoc,
        Op::Enable(false),
    ]);
    ops.extend(restore_ops());
    ops
}
