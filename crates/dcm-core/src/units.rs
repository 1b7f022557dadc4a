// dcm-core/src/units.rs

use uom::si::f64::{
    ElectricPotential as UomElectricPotential, ElectricalResistance as UomElectricalResistance,
    Inductance as UomInductance, MomentOfInertia as UomMomentOfInertia, Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Voltage = UomElectricPotential;
pub type Resistance = UomElectricalResistance;
pub type Inductance = UomInductance;
pub type Inertia = UomMomentOfInertia;
pub type Time = UomTime;

#[inline]
pub fn ohm(v: f64) -> Resistance {
    use uom::si::electrical_resistance::ohm;
    Resistance::new::<ohm>(v)
}

#[inline]
pub fn henry(v: f64) -> Inductance {
    use uom::si::inductance::henry;
    Inductance::new::<henry>(v)
}

#[inline]
pub fn kgm2(v: f64) -> Inertia {
    use uom::si::moment_of_inertia::kilogram_square_meter;
    Inertia::new::<kilogram_square_meter>(v)
}

#[inline]
pub fn volt(v: f64) -> Voltage {
    use uom::si::electric_potential::volt;
    Voltage::new::<volt>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}
