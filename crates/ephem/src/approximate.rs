//! Approximate planetary positions from mean Keplerian elements and their secular rates.
//!
//! Elements and rates follow JPL's "Keplerian Elements for Approximate Positions of
//! the Major Planets" (E. M. Standish), valid 1800 AD - 2050 AD, referred to the
//! mean ecliptic and equinox of J2000.

use mga_core::constants::MU_SUN;
use mga_core::time::julian_centuries_since_j2000;
use mga_core::units::au_to_km;
use mga_orbits::{KeplerElements, elements_to_state};

use crate::{Ephemeris, EphemerisError, StateVector};

/// Planets covered by the approximate ephemeris table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Planet {
    Mercury,
    Venus,
    EarthMoonBarycenter,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Planet {
    /// Resolve a planet from a body name; Earth maps to the Earth-Moon barycenter.
    pub fn from_name(name: &str) -> Result<Self, EphemerisError> {
        let upper = name.trim().to_ascii_uppercase();
        let stripped = upper.strip_suffix(" BARYCENTER").unwrap_or(&upper);
        match stripped {
            "MERCURY" => Ok(Self::Mercury),
            "VENUS" => Ok(Self::Venus),
            "EARTH" | "EARTH-MOON" | "EARTH MOON" | "EMB" => Ok(Self::EarthMoonBarycenter),
            "MARS" => Ok(Self::Mars),
            "JUPITER" => Ok(Self::Jupiter),
            "SATURN" => Ok(Self::Saturn),
            "URANUS" => Ok(Self::Uranus),
            "NEPTUNE" => Ok(Self::Neptune),
            "PLUTO" => Ok(Self::Pluto),
            _ => Err(EphemerisError::UnknownPlanet(name.to_string())),
        }
    }

    /// `[a (AU), e, I (deg), L (deg), long. peri (deg), long. node (deg)]` at J2000
    /// followed by their rates per Julian century.
    fn table(self) -> ([f64; 6], [f64; 6]) {
        match self {
            Self::Mercury => (
                [0.387_099_27, 0.205_635_93, 7.004_979_02, 252.250_323_50, 77.457_796_28, 48.330_765_93],
                [0.000_000_37, 0.000_019_06, -0.005_947_49, 149_472.674_111_75, 0.160_476_89, -0.125_340_81],
            ),
            Self::Venus => (
                [0.723_335_66, 0.006_776_72, 3.394_676_05, 181.979_099_50, 131.602_467_18, 76.679_842_55],
                [0.000_003_90, -0.000_041_07, -0.000_788_90, 58_517.815_387_29, 0.002_683_29, -0.277_694_18],
            ),
            Self::EarthMoonBarycenter => (
                [1.000_002_61, 0.016_711_23, -0.000_015_31, 100.464_571_66, 102.937_681_93, 0.0],
                [0.000_005_62, -0.000_043_92, -0.012_946_68, 35_999.372_449_81, 0.323_273_64, 0.0],
            ),
            Self::Mars => (
                [1.523_710_34, 0.093_394_10, 1.849_691_42, -4.553_432_05, -23.943_629_59, 49.559_538_91],
                [0.000_018_47, 0.000_078_82, -0.008_131_31, 19_140.302_684_99, 0.444_410_88, -0.292_573_43],
            ),
            Self::Jupiter => (
                [5.202_887_00, 0.048_386_24, 1.304_396_95, 34.396_440_51, 14.728_479_83, 100.473_909_09],
                [-0.000_116_07, -0.000_132_53, -0.001_837_14, 3_034.746_127_75, 0.212_526_68, 0.204_691_06],
            ),
            Self::Saturn => (
                [9.536_675_94, 0.053_861_79, 2.485_991_87, 49.954_244_23, 92.598_878_31, 113.662_424_48],
                [-0.001_250_60, -0.000_509_91, 0.001_936_09, 1_222.493_622_01, -0.418_972_16, -0.288_677_94],
            ),
            Self::Uranus => (
                [19.189_164_64, 0.047_257_44, 0.772_637_83, 313.238_104_51, 170.954_276_30, 74.016_925_03],
                [-0.001_961_76, -0.000_043_97, -0.002_429_39, 428.482_027_85, 0.408_052_81, 0.042_405_89],
            ),
            Self::Neptune => (
                [30.069_922_76, 0.008_590_48, 1.770_043_47, -55.120_029_69, 44.964_762_27, 131.784_225_74],
                [0.000_262_91, 0.000_051_05, 0.000_353_72, 218.459_453_25, -0.322_414_64, -0.005_086_64],
            ),
            Self::Pluto => (
                [39.482_116_75, 0.248_827_30, 17.140_012_06, 238.929_038_33, 224.068_916_29, 110.303_936_84],
                [-0.000_315_96, 0.000_051_70, 0.000_048_18, 145.207_805_15, -0.040_629_42, -0.011_834_82],
            ),
        }
    }

    /// Mean elements at an epoch (seconds past J2000).
    pub fn elements_at(self, epoch_s: f64) -> KeplerElements {
        let (base, rate) = self.table();
        let t = julian_centuries_since_j2000(epoch_s);
        let value = |i: usize| base[i] + rate[i] * t;

        let mean_longitude = value(3);
        let longitude_of_perihelion = value(4);
        let longitude_of_node = value(5);

        KeplerElements {
            semi_major_axis_km: au_to_km(value(0)),
            eccentricity: value(1),
            inclination: value(2).to_radians(),
            raan: longitude_of_node.to_radians(),
            argument_of_periapsis: (longitude_of_perihelion - longitude_of_node).to_radians(),
            mean_anomaly: (mean_longitude - longitude_of_perihelion).to_radians(),
        }
    }
}

/// Heliocentric planet ephemeris built on [`Planet::elements_at`].
///
/// Velocities are the two-body velocities of the osculating ellipse about the Sun.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximatePlanet {
    pub planet: Planet,
    pub central_mu_km3_s2: f64,
}

impl ApproximatePlanet {
    pub fn new(planet: Planet) -> Self {
        Self {
            planet,
            central_mu_km3_s2: MU_SUN,
        }
    }
}

impl Ephemeris for ApproximatePlanet {
    fn state(&self, epoch_s: f64) -> Result<StateVector, EphemerisError> {
        let elements = self.planet.elements_at(epoch_s);
        let (position_km, velocity_km_s) = elements_to_state(&elements, self.central_mu_km3_s2)?;
        Ok(StateVector {
            position_km,
            velocity_km_s,
        })
    }
}
