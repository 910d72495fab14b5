//! ADC register configuration table
//!
//! Every register mode, sample time, and channel number used by the
//! [`Reader`](crate::Reader) lives here.
//! The sequencing logic only ever sees a [`Table`], retargeting to another
//! family with the same StdPeriph-style ADC is a matter of providing a new
//! table.
//!
//! Bit positions are from RM0033 rev 9 section 10.13 "ADC registers".

use crate::reader::AVG_SLOPE;

/// ADC_CCR MULTI\[4:0\]
pub const CCR_MULTI_MASK: u32 = 0x1F;
/// ADC_CCR DELAY\[3:0\]
pub const CCR_DELAY_MASK: u32 = 0xF << 8;
/// ADC_CCR DMA\[1:0\]
pub const CCR_DMA_MASK: u32 = 0b11 << 14;
/// ADC_CCR ADCPRE\[1:0\]
pub const CCR_ADCPRE_MASK: u32 = 0b11 << 16;
/// Fields of ADC_CCR written by [`CommonInit`].
pub const CCR_INIT_MASK: u32 = CCR_MULTI_MASK | CCR_DELAY_MASK | CCR_DMA_MASK | CCR_ADCPRE_MASK;

/// ADC_CR1 SCAN
pub const CR1_SCAN: u32 = 1 << 8;
/// ADC_CR1 RES\[1:0\]
pub const CR1_RES_MASK: u32 = 0b11 << 24;
/// Fields of ADC_CR1 written by [`Init`].
pub const CR1_INIT_MASK: u32 = CR1_SCAN | CR1_RES_MASK;

/// ADC_CR2 CONT
pub const CR2_CONT: u32 = 1 << 1;
/// ADC_CR2 ALIGN
pub const CR2_ALIGN: u32 = 1 << 11;
/// ADC_CR2 EXTSEL\[3:0\]
pub const CR2_EXTSEL_MASK: u32 = 0xF << 24;
/// ADC_CR2 EXTEN\[1:0\]
pub const CR2_EXTEN_MASK: u32 = 0b11 << 28;
/// Fields of ADC_CR2 written by [`Init`].
pub const CR2_INIT_MASK: u32 = CR2_CONT | CR2_ALIGN | CR2_EXTSEL_MASK | CR2_EXTEN_MASK;

/// ADC_SQR1 L\[3:0\]
pub const SQR1_L_MASK: u32 = 0xF << 20;
/// ADC_SQR3 SQ1\[4:0\]
pub const SQR3_SQ1_MASK: u32 = 0x1F;

/// SQRx register index and field offset for a regular sequence rank.
///
/// Ranks 1-6 are in SQR3, 7-12 in SQR2, 13-16 in SQR1.
/// Returns `None` for ranks outside 1 to 16.
///
/// # Example
///
/// ```
/// use stm32f2xx_vbat::adc::sqr_pos;
///
/// assert_eq!(sqr_pos(1), Some((3, 0)));
/// assert_eq!(sqr_pos(8), Some((2, 5)));
/// assert_eq!(sqr_pos(16), Some((1, 15)));
/// assert_eq!(sqr_pos(0), None);
/// assert_eq!(sqr_pos(17), None);
/// ```
pub const fn sqr_pos(rank: u8) -> Option<(u8, u8)> {
    match rank {
        1..=6 => Some((3, (rank - 1) * 5)),
        7..=12 => Some((2, (rank - 7) * 5)),
        13..=16 => Some((1, (rank - 13) * 5)),
        _ => None,
    }
}

/// ADC channels
///
/// Channels 16 through 18 are internal, they are only connected to ADC1.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Ch {
    In0 = 0,
    In1 = 1,
    In2 = 2,
    In3 = 3,
    In4 = 4,
    In5 = 5,
    In6 = 6,
    In7 = 7,
    In8 = 8,
    In9 = 9,
    In10 = 10,
    In11 = 11,
    In12 = 12,
    In13 = 13,
    In14 = 14,
    In15 = 15,
    /// Junction temperature sensor.
    Vts = 16,
    /// Internal voltage reference.
    Vrefint = 17,
    /// Battery voltage divided by 2.
    Vbat = 18,
}

impl Ch {
    /// Returns `true` if the channel is an on-chip source.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32f2xx_vbat::adc::Ch;
    ///
    /// assert!(Ch::Vts.is_internal());
    /// assert!(!Ch::In15.is_internal());
    /// ```
    pub const fn is_internal(self) -> bool {
        (self as u8) >= (Ch::Vts as u8)
    }
}

impl From<Ch> for u8 {
    fn from(ch: Ch) -> Self {
        ch as u8
    }
}

/// ADC sample times
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SampleTime {
    /// 3 ADC clock cycles
    Cyc3 = 0,
    /// 15 ADC clock cycles
    Cyc15 = 1,
    /// 28 ADC clock cycles
    Cyc28 = 2,
    /// 56 ADC clock cycles
    Cyc56 = 3,
    /// 84 ADC clock cycles
    Cyc84 = 4,
    /// 112 ADC clock cycles
    Cyc112 = 5,
    /// 144 ADC clock cycles
    Cyc144 = 6,
    /// 480 ADC clock cycles
    Cyc480 = 7,
}

impl SampleTime {
    /// Maximum sample time, 480 ADC clock cycles.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32f2xx_vbat::adc::SampleTime;
    ///
    /// assert_eq!(SampleTime::MAX, SampleTime::Cyc480);
    /// ```
    pub const MAX: Self = Self::Cyc480;

    /// SMPRx field offset and register index for a channel.
    ///
    /// Channels 0-9 are in SMPR2, channels 10-18 are in SMPR1.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32f2xx_vbat::adc::{Ch, SampleTime};
    ///
    /// assert_eq!(SampleTime::smpr_pos(Ch::In0), (2, 0));
    /// assert_eq!(SampleTime::smpr_pos(Ch::Vts), (1, 18));
    /// assert_eq!(SampleTime::smpr_pos(Ch::Vbat), (1, 24));
    /// ```
    pub const fn smpr_pos(ch: Ch) -> (u8, u8) {
        let ch: u8 = ch as u8;
        if ch < 10 { (2, ch * 3) } else { (1, (ch - 10) * 3) }
    }
}

impl From<SampleTime> for u32 {
    fn from(ts: SampleTime) -> Self {
        ts as u32
    }
}

/// Multi ADC mode selection.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    /// All ADCs independent.
    Independent = 0b00000,
    /// Dual mode, regular simultaneous mode only.
    DualRegSimult = 0b00110,
}

/// ADC prescaler, division of PCLK2.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Prescaler {
    Div2 = 0b00,
    Div4 = 0b01,
    Div6 = 0b10,
    Div8 = 0b11,
}

/// Direct memory access mode for multi ADC mode.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum DmaAccess {
    Disabled = 0b00,
    Mode1 = 0b01,
    Mode2 = 0b10,
    Mode3 = 0b11,
}

/// Delay between 2 sampling phases in dual or triple interleaved modes.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum TwoSamplingDelay {
    Cyc5 = 0,
    Cyc6 = 1,
    Cyc7 = 2,
    Cyc8 = 3,
    Cyc9 = 4,
    Cyc10 = 5,
    Cyc11 = 6,
    Cyc12 = 7,
    Cyc13 = 8,
    Cyc14 = 9,
    Cyc15 = 10,
    Cyc16 = 11,
    Cyc17 = 12,
    Cyc18 = 13,
    Cyc19 = 14,
    Cyc20 = 15,
}

/// Conversion resolution.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Resolution {
    Bits12 = 0b00,
    Bits10 = 0b01,
    Bits8 = 0b10,
    Bits6 = 0b11,
}

impl Resolution {
    /// Maximum conversion code for this resolution.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32f2xx_vbat::adc::Resolution;
    ///
    /// assert_eq!(Resolution::Bits12.full_scale(), 4095);
    /// assert_eq!(Resolution::Bits6.full_scale(), 63);
    /// ```
    pub const fn full_scale(&self) -> u16 {
        match self {
            Resolution::Bits12 => 0x0FFF,
            Resolution::Bits10 => 0x03FF,
            Resolution::Bits8 => 0x00FF,
            Resolution::Bits6 => 0x003F,
        }
    }

    /// Number of bits in a conversion code.
    pub const fn bits(&self) -> u8 {
        match self {
            Resolution::Bits12 => 12,
            Resolution::Bits10 => 10,
            Resolution::Bits8 => 8,
            Resolution::Bits6 => 6,
        }
    }
}

/// Data alignment in the data register.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Align {
    Right = 0,
    Left = 1,
}

/// External trigger enable and polarity for regular channels.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TrigEdge {
    /// Trigger detection disabled, conversions are started by software.
    None = 0b00,
    /// Rising edge.
    Rising = 0b01,
    /// Falling edge.
    Falling = 0b10,
    /// Rising and falling edges.
    Both = 0b11,
}

/// External event select for regular groups.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ExtTrig {
    Tim1Cc1 = 0,
    Tim1Cc2 = 1,
    Tim1Cc3 = 2,
    Tim2Cc2 = 3,
    Tim2Cc3 = 4,
    Tim2Cc4 = 5,
    Tim2Trgo = 6,
    Tim3Cc1 = 7,
    Tim3Trgo = 8,
    Tim4Cc4 = 9,
    Tim5Cc1 = 10,
    Tim5Cc2 = 11,
    Tim5Cc3 = 12,
    Tim8Cc1 = 13,
    Tim8Trgo = 14,
    Exti11 = 15,
}

/// ADC instances that are reconfigured as a pair.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum Unit {
    Adc1,
    Adc2,
}

/// Settings shared by all ADCs (ADC_CCR).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommonInit {
    /// Multi ADC mode.
    pub mode: Mode,
    /// Clock prescaler.
    pub prescaler: Prescaler,
    /// DMA access mode.
    pub dma: DmaAccess,
    /// Delay between sampling phases.
    pub delay: TwoSamplingDelay,
}

impl CommonInit {
    /// ADC_CCR bits for this configuration.
    ///
    /// Only the bits in [`CCR_INIT_MASK`] are set, VBATE and TSVREFE are
    /// left to the caller.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32f2xx_vbat::adc::STM32F2XX;
    ///
    /// assert_eq!(STM32F2XX.claim_common.ccr_bits(), 0x0000_4000);
    /// assert_eq!(STM32F2XX.platform_common.ccr_bits(), 0x0000_4006);
    /// ```
    pub const fn ccr_bits(&self) -> u32 {
        (self.mode as u32)
            | (self.delay as u32) << 8
            | (self.dma as u32) << 14
            | (self.prescaler as u32) << 16
    }
}

/// Settings for a single ADC.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Init {
    /// Conversion resolution.
    pub resolution: Resolution,
    /// Scan through the regular sequence.
    pub scan: bool,
    /// Restart conversions as soon as one ends.
    pub continuous: bool,
    /// External trigger edge.
    pub edge: TrigEdge,
    /// External trigger source.
    pub trigger: ExtTrig,
    /// Data alignment.
    pub align: Align,
    /// Length of the regular sequence, 1 to 16.
    pub conversions: u8,
}

impl Init {
    /// ADC_CR1 bits for this configuration.
    pub const fn cr1_bits(&self) -> u32 {
        (if self.scan { CR1_SCAN } else { 0 }) | (self.resolution as u32) << 24
    }

    /// ADC_CR2 bits for this configuration.
    ///
    /// ADON and SWSTART are never set.
    pub const fn cr2_bits(&self) -> u32 {
        (if self.continuous { CR2_CONT } else { 0 })
            | (self.align as u32) << 11
            | (self.trigger as u32) << 24
            | (self.edge as u32) << 28
    }

    /// ADC_SQR1 bits for this configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32f2xx_vbat::adc::STM32F2XX;
    ///
    /// assert_eq!(STM32F2XX.claim.sqr1_bits(), 0);
    /// ```
    pub const fn sqr1_bits(&self) -> u32 {
        (self.conversions.saturating_sub(1) as u32 & 0xF) << 20
    }
}

/// Complete register configuration for one microcontroller family.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Table {
    /// ADCs initialized on claim and on restore.
    pub units: &'static [Unit],
    /// Common settings while claimed.
    pub claim_common: CommonInit,
    /// Per-ADC settings while claimed.
    pub claim: Init,
    /// Common settings the platform firmware expects.
    pub platform_common: CommonInit,
    /// Per-ADC settings the platform firmware expects.
    pub platform: Init,
    /// Sample time for internal channels.
    pub sample_time: SampleTime,
    /// Rank of the internal channel in the regular sequence, 1 to 16.
    pub rank: u8,
    /// Battery voltage channel.
    pub vbat: Ch,
    /// Temperature sensor channel.
    pub temp: Ch,
}

impl Table {
    /// Full scale code of an internal conversion.
    ///
    /// Internal conversions run at the claim resolution.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32f2xx_vbat::adc::STM32F2XX;
    ///
    /// assert_eq!(STM32F2XX.full_scale(), 4095);
    /// ```
    pub const fn full_scale(&self) -> u16 {
        self.claim.resolution.full_scale()
    }

    /// Convert a raw VBAT code to volts.
    ///
    /// `scale` is the voltage a full scale code corresponds to.
    pub fn vbat_volts(&self, raw: u16, scale: f32) -> f32 {
        f32::from(raw) * scale / f32::from(self.full_scale())
    }

    /// Convert a raw temperature sensor code to degrees Celsius.
    ///
    /// `cal` is the raw code at 25 °C, at the claim resolution.
    /// The sensor slope is scaled down from 12 bits.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32f2xx_vbat::adc::{Resolution, STM32F2XX, Table};
    ///
    /// assert_eq!(STM32F2XX.temp_celsius(1193, 943), 125.0);
    ///
    /// let mut bits10: Table = STM32F2XX;
    /// bits10.claim.resolution = Resolution::Bits10;
    /// assert_eq!(bits10.temp_celsius(261, 236), 65.0);
    /// ```
    pub fn temp_celsius(&self, raw: u16, cal: u16) -> f32 {
        let shift: u8 = 12_u8.saturating_sub(self.claim.resolution.bits());
        let slope: f32 = AVG_SLOPE / f32::from(1_u16 << shift);
        (f32::from(raw) - f32::from(cal)) / slope + 25.0
    }
}

/// STM32F205/207/215/217 configuration.
///
/// The platform side is the baseline the firmware's generic analog read
/// programs once at startup: ADC1 and ADC2 in dual regular simultaneous mode,
/// scanning and continuous.
///
/// # Example
///
/// ```
/// use stm32f2xx_vbat::adc::{Ch, Mode, SampleTime, STM32F2XX};
///
/// assert_eq!(STM32F2XX.claim_common.mode, Mode::Independent);
/// assert_eq!(STM32F2XX.platform_common.mode, Mode::DualRegSimult);
/// assert_eq!(STM32F2XX.sample_time, SampleTime::MAX);
/// assert_eq!(STM32F2XX.vbat, Ch::Vbat);
/// assert_eq!(STM32F2XX.temp, Ch::Vts);
/// ```
pub const STM32F2XX: Table = Table {
    units: &[Unit::Adc1, Unit::Adc2],
    claim_common: CommonInit {
        mode: Mode::Independent,
        prescaler: Prescaler::Div2,
        dma: DmaAccess::Mode1,
        delay: TwoSamplingDelay::Cyc5,
    },
    claim: Init {
        resolution: Resolution::Bits12,
        scan: false,
        continuous: false,
        edge: TrigEdge::None,
        trigger: ExtTrig::Tim1Cc1,
        align: Align::Right,
        conversions: 1,
    },
    platform_common: CommonInit {
        mode: Mode::DualRegSimult,
        prescaler: Prescaler::Div2,
        dma: DmaAccess::Mode1,
        delay: TwoSamplingDelay::Cyc5,
    },
    platform: Init {
        resolution: Resolution::Bits12,
        scan: true,
        continuous: true,
        edge: TrigEdge::None,
        trigger: ExtTrig::Tim1Cc1,
        align: Align::Right,
        conversions: 1,
    },
    sample_time: SampleTime::MAX,
    rank: 1,
    vbat: Ch::Vbat,
    temp: Ch::Vts,
};
