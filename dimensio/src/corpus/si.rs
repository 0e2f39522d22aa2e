//! Built-in SI catalog
//!
//! Populates a corpus with the seven SI base dimensions, the common
//! derived dimensions, SI/binary prefixes and a selection of metric,
//! imperial, US customary and nautical units. Factors are exact where
//! the unit is defined exactly (inch, pound, calorie...).

use super::{
    Corpus, DefinitionId, DimensionDefinition, MeasurementSystem, Prefix, PrefixType, SystemId,
    Unit,
};
use crate::error::Result;
use tracing::debug;

/// A fresh corpus holding the built-in catalog
pub fn bootstrap() -> Result<Corpus> {
    let mut corpus = Corpus::new();
    populate(&mut corpus)?;
    Ok(corpus)
}

/// Register the built-in catalog into an existing corpus
///
/// Fails with `DuplicateKey` if any built-in key is already taken.
pub fn populate(corpus: &mut Corpus) -> Result<()> {
    let systems = register_systems(corpus)?;
    register_prefixes(corpus)?;
    let dims = register_definitions(corpus)?;
    register_units(corpus, &dims, &systems)?;
    debug!(
        definitions = corpus.definitions().len(),
        units = corpus.units().len(),
        prefixes = corpus.prefixes().len(),
        "bootstrapped SI catalog"
    );
    Ok(())
}

struct Systems {
    metric: SystemId,
    si: SystemId,
    imperial: SystemId,
    us: SystemId,
    nautical: SystemId,
}

struct Definitions {
    length: DefinitionId,
    mass: DefinitionId,
    time: DefinitionId,
    current: DefinitionId,
    temperature: DefinitionId,
    amount: DefinitionId,
    luminosity: DefinitionId,
    information: DefinitionId,
    angle: DefinitionId,
    ratio: DefinitionId,
    speed: DefinitionId,
    acceleration: DefinitionId,
    force: DefinitionId,
    energy: DefinitionId,
    power: DefinitionId,
    frequency: DefinitionId,
    area: DefinitionId,
    volume: DefinitionId,
    pressure: DefinitionId,
}

fn register_systems(corpus: &mut Corpus) -> Result<Systems> {
    let metric = corpus.add_system(MeasurementSystem::root("metric").named("Metric"))?;
    let si = corpus.add_system(
        MeasurementSystem::child_of("si", metric)
            .named("International System of Units")
            .alias("SI units"),
    )?;
    let imperial = corpus.add_system(MeasurementSystem::root("imperial").named("Imperial"))?;
    let us = corpus.add_system(
        MeasurementSystem::child_of("us-customary", imperial)
            .named("United States customary")
            .alias("US"),
    )?;
    let nautical = corpus.add_system(MeasurementSystem::root("nautical").named("Nautical"))?;
    Ok(Systems { metric, si, imperial, us, nautical })
}

fn register_prefixes(corpus: &mut Corpus) -> Result<()> {
    use PrefixType::*;

    const SI: &[(&str, &str, f64, bool)] = &[
        ("quetta", "Q", 1e30, true),
        ("ronna", "R", 1e27, true),
        ("yotta", "Y", 1e24, false),
        ("zetta", "Z", 1e21, false),
        ("exa", "E", 1e18, false),
        ("peta", "P", 1e15, false),
        ("tera", "T", 1e12, false),
        ("giga", "G", 1e9, false),
        ("mega", "M", 1e6, false),
        ("kilo", "k", 1e3, false),
        ("hecto", "h", 1e2, false),
        ("deca", "da", 1e1, false),
        ("deci", "d", 1e-1, false),
        ("centi", "c", 1e-2, false),
        ("milli", "m", 1e-3, false),
        ("micro", "µ", 1e-6, false),
        ("nano", "n", 1e-9, false),
        ("pico", "p", 1e-12, false),
        ("femto", "f", 1e-15, false),
        ("atto", "a", 1e-18, false),
        ("zepto", "z", 1e-21, false),
        ("yocto", "y", 1e-24, false),
        ("ronto", "r", 1e-27, true),
        ("quecto", "q", 1e-30, true),
    ];
    for &(key, symbol, factor, rare) in SI {
        let mut prefix = Prefix::new(key, symbol, factor, Si);
        match key {
            "deca" => prefix = prefix.alias("deka"),
            "micro" => prefix = prefix.alias("u").alias("mc"),
            _ => {}
        }
        if rare {
            prefix = prefix.rare();
        }
        corpus.add_prefix(prefix)?;
    }

    const BINARY: &[(&str, &str, i32)] = &[
        ("kibi", "Ki", 10),
        ("mebi", "Mi", 20),
        ("gibi", "Gi", 30),
        ("tebi", "Ti", 40),
        ("pebi", "Pi", 50),
        ("exbi", "Ei", 60),
    ];
    for &(key, symbol, exp) in BINARY {
        corpus.add_prefix(Prefix::new(key, symbol, 2f64.powi(exp), SiBinary))?;
    }

    corpus.add_prefix(Prefix::new("myria", "my", 1e4, SiUnofficial))?;
    corpus.add_prefix(Prefix::new("hebdo", "hb", 1e7, SiUnofficial).rare())?;
    corpus.add_prefix(Prefix::new("binary-kilo", "K", 1024.0, BinaryUnofficial))?;
    Ok(())
}

fn register_definitions(corpus: &mut Corpus) -> Result<Definitions> {
    let mut base = |key: &str, name: &str, symbol: &str| {
        corpus.add_definition(DimensionDefinition::new(key).named(name).with_symbol(symbol))
    };
    let length = base("length", "Length", "L")?;
    let mass = base("mass", "Mass", "M")?;
    let time = base("time", "Time", "T")?;
    let current = base("current", "Electric current", "I")?;
    let temperature = base("temperature", "Thermodynamic temperature", "Θ")?;
    let amount = base("amount", "Amount of substance", "N")?;
    let luminosity = base("luminosity", "Luminous intensity", "J")?;
    let information = base("information", "Information", "B")?;

    let angle = corpus.add_definition(
        DimensionDefinition::new("angle").named("Plane angle").dimensionless(),
    )?;
    let ratio = corpus.add_definition(
        DimensionDefinition::new("ratio").named("Ratio").alias("fraction").dimensionless(),
    )?;

    let mut derived = |key: &str, name: &str, expression: &str| {
        corpus.add_definition(DimensionDefinition::derived(key, expression).named(name))
    };
    let speed = derived("speed", "Speed", "length/time")?;
    let acceleration = derived("acceleration", "Acceleration", "length/time^2")?;
    let force = derived("force", "Force", "mass*length/time^2")?;
    let energy = derived("energy", "Energy", "force*length")?;
    let power = derived("power", "Power", "energy/time")?;
    let frequency = derived("frequency", "Frequency", "1/time")?;
    let area = derived("area", "Area", "length^2")?;
    let volume = derived("volume", "Volume", "length^3")?;
    let pressure = derived("pressure", "Pressure", "force/area")?;

    corpus.add_definition(
        DimensionDefinition::derived("velocity", "length/time")
            .named("Velocity")
            .vector(),
    )?;

    Ok(Definitions {
        length,
        mass,
        time,
        current,
        temperature,
        amount,
        luminosity,
        information,
        angle,
        ratio,
        speed,
        acceleration,
        force,
        energy,
        power,
        frequency,
        area,
        volume,
        pressure,
    })
}

fn register_units(corpus: &mut Corpus, d: &Definitions, s: &Systems) -> Result<()> {
    // Length
    corpus.add_unit(
        Unit::new("metre", "m", d.length, 1.0)
            .alias("meter")
            .in_system(s.si),
    )?;
    corpus.add_unit(
        Unit::new("inch", "in", d.length, 0.0254)
            .alias("inches")
            .in_system(s.imperial),
    )?;
    corpus.add_unit(
        Unit::new("foot", "ft", d.length, 0.3048)
            .alias("feet")
            .in_system(s.imperial),
    )?;
    corpus.add_unit(
        Unit::new("yard", "yd", d.length, 0.9144)
            .in_system(s.imperial),
    )?;
    corpus.add_unit(
        Unit::new("mile", "mi", d.length, 1609.344)
            .in_system(s.imperial),
    )?;
    corpus.add_unit(
        Unit::new("furlong", "fur", d.length, 201.168)
            .in_system(s.imperial)
            .rare(),
    )?;
    corpus.add_unit(
        Unit::new("nautical-mile", "nmi", d.length, 1852.0)
            .named("nautical mile")
            .in_system(s.nautical),
    )?;
    corpus.add_unit(
        Unit::new("astronomical-unit", "au", d.length, 1.495_978_707e11)
            .named("astronomical unit")
            .rare(),
    )?;
    corpus.add_unit(
        Unit::new("light-year", "ly", d.length, 9.460_730_472_580_8e15)
            .named("light year")
            .rare(),
    )?;

    // Mass
    corpus.add_unit(
        Unit::new("kilogram", "kg", d.mass, 1.0)
            .alias("kilogramme")
            .in_system(s.si),
    )?;
    corpus.add_unit(
        Unit::new("gram", "g", d.mass, 1e-3)
            .alias("gramme")
            .in_system(s.metric),
    )?;
    corpus.add_unit(
        Unit::new("tonne", "t", d.mass, 1e3)
            .alias("metric ton")
            .in_system(s.metric),
    )?;
    corpus.add_unit(
        Unit::new("pound", "lb", d.mass, 0.453_592_37)
            .alias("lbs")
            .in_system(s.imperial),
    )?;
    corpus.add_unit(
        Unit::new("ounce", "oz", d.mass, 0.028_349_523_125)
            .in_system(s.imperial),
    )?;
    corpus.add_unit(
        Unit::new("grain", "gr", d.mass, 6.479_891e-5)
            .in_system(s.imperial)
            .rare(),
    )?;

    // Time
    corpus.add_unit(
        Unit::new("second", "s", d.time, 1.0)
            .alias("sec")
            .in_system(s.si),
    )?;
    corpus.add_unit(Unit::new("minute", "min", d.time, 60.0).in_system(s.metric))?;
    corpus.add_unit(
        Unit::new("hour", "h", d.time, 3600.0)
            .alias("hr")
            .in_system(s.metric),
    )?;
    corpus.add_unit(Unit::new("day", "d", d.time, 86_400.0).in_system(s.metric))?;
    corpus.add_unit(Unit::new("week", "wk", d.time, 604_800.0))?;
    corpus.add_unit(
        Unit::new("year", "yr", d.time, 31_557_600.0)
            .named("julian year")
            .alias("annum"),
    )?;
    corpus.add_unit(Unit::new("month", "mo", d.time, 2_629_800.0).estimated())?;

    // Remaining base dimensions
    corpus.add_unit(
        Unit::new("ampere", "A", d.current, 1.0)
            .alias("amp")
            .in_system(s.si),
    )?;
    corpus.add_unit(Unit::new("mole", "mol", d.amount, 1.0).in_system(s.si))?;
    corpus.add_unit(
        Unit::new("candela", "cd", d.luminosity, 1.0)
            .in_system(s.si),
    )?;
    corpus.add_unit(Unit::new("kelvin", "K", d.temperature, 1.0).in_system(s.si))?;
    corpus.add_unit(
        Unit::new("degree-celsius", "°C", d.temperature, 1.0)
            .named("degree Celsius")
            .alias("celsius")
            .alias("degC")
            .with_offset(273.15)
            .in_system(s.metric),
    )?;
    corpus.add_unit(
        Unit::new("degree-fahrenheit", "°F", d.temperature, 5.0 / 9.0)
            .named("degree Fahrenheit")
            .alias("fahrenheit")
            .alias("degF")
            .with_offset(459.67 * 5.0 / 9.0)
            .in_system(s.imperial),
    )?;

    // Information
    corpus.add_unit(Unit::new("bit", "bit", d.information, 1.0))?;
    corpus.add_unit(Unit::new("byte", "B", d.information, 8.0).alias("octet"))?;

    // Dimensionless
    corpus.add_unit(Unit::new("radian", "rad", d.angle, 1.0).in_system(s.si))?;
    corpus.add_unit(
        Unit::new("degree", "deg", d.angle, std::f64::consts::PI / 180.0)
            .alias("°")
            .in_system(s.metric),
    )?;
    corpus.add_unit(Unit::new("percent", "%", d.ratio, 0.01).alias("pct"))?;
    corpus.add_unit(Unit::new("parts-per-million", "ppm", d.ratio, 1e-6).rare())?;

    // Derived
    corpus.add_unit(
        Unit::new("metre-per-second", "m/s", d.speed, 1.0)
            .named("metre per second")
            .in_system(s.si),
    )?;
    corpus.add_unit(
        Unit::new("kilometre-per-hour", "km/h", d.speed, 1000.0 / 3600.0)
            .named("kilometre per hour")
            .alias("kph")
            .in_system(s.metric),
    )?;
    corpus.add_unit(
        Unit::new("mile-per-hour", "mph", d.speed, 0.44704)
            .named("mile per hour")
            .in_system(s.imperial),
    )?;
    corpus.add_unit(
        Unit::new("knot", "kn", d.speed, 1852.0 / 3600.0)
            .alias("kt")
            .in_system(s.nautical),
    )?;
    corpus.add_unit(
        Unit::new("metre-per-second-squared", "m/s²", d.acceleration, 1.0)
            .named("metre per second squared")
            .alias("m/s2")
            .in_system(s.si),
    )?;
    corpus.add_unit(Unit::new("newton", "N", d.force, 1.0).in_system(s.si))?;
    corpus.add_unit(
        Unit::new("pound-force", "lbf", d.force, 4.448_221_615_260_5)
            .in_system(s.imperial),
    )?;
    corpus.add_unit(Unit::new("joule", "J", d.energy, 1.0).in_system(s.si))?;
    corpus.add_unit(
        Unit::new("calorie", "cal", d.energy, 4.184)
            .in_system(s.metric),
    )?;
    corpus.add_unit(
        Unit::new("kilowatt-hour", "kWh", d.energy, 3.6e6)
            .named("kilowatt hour")
            .in_system(s.metric),
    )?;
    corpus.add_unit(
        Unit::new("electronvolt", "eV", d.energy, 1.602_176_634e-19)
            .rare(),
    )?;
    corpus.add_unit(Unit::new("watt", "W", d.power, 1.0).in_system(s.si))?;
    corpus.add_unit(
        Unit::new("horsepower", "hp", d.power, 745.699_871_582_270_2)
            .in_system(s.imperial),
    )?;
    corpus.add_unit(Unit::new("hertz", "Hz", d.frequency, 1.0).in_system(s.si))?;
    corpus.add_unit(
        Unit::new("square-metre", "m²", d.area, 1.0)
            .named("square metre")
            .alias("m2")
            .in_system(s.si),
    )?;
    corpus.add_unit(Unit::new("hectare", "ha", d.area, 1e4).in_system(s.metric))?;
    corpus.add_unit(
        Unit::new("acre", "ac", d.area, 4_046.856_422_4)
            .in_system(s.imperial),
    )?;
    corpus.add_unit(
        Unit::new("cubic-metre", "m³", d.volume, 1.0)
            .named("cubic metre")
            .alias("m3")
            .in_system(s.si),
    )?;
    corpus.add_unit(
        Unit::new("litre", "L", d.volume, 1e-3)
            .alias("liter")
            .alias("l")
            .in_system(s.metric),
    )?;
    corpus.add_unit(
        Unit::new("gallon", "gal", d.volume, 3.785_411_784e-3)
            .named("US gallon")
            .in_system(s.us),
    )?;
    corpus.add_unit(Unit::new("pascal", "Pa", d.pressure, 1.0).in_system(s.si))?;
    corpus.add_unit(Unit::new("bar", "bar", d.pressure, 1e5).in_system(s.metric))?;
    corpus.add_unit(
        Unit::new("atmosphere", "atm", d.pressure, 101_325.0)
            .named("standard atmosphere"),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap() {
        let corpus = bootstrap().unwrap();
        assert!(corpus.definition_id("length").is_some());
        assert!(corpus.unit_id("metre").is_some());
        assert!(corpus.prefix_id("kilo").is_some());
        assert_eq!(corpus.root_systems().len(), 3);
    }

    #[test]
    fn test_signatures() {
        let corpus = bootstrap().unwrap();
        let id = |k| corpus.definition_id(k).unwrap();
        let force = corpus.definition_signature(id("force"));
        let energy = corpus.definition_signature(id("energy"));
        assert_eq!(force.get(&id("mass")), Some(&1));
        assert_eq!(force.get(&id("time")), Some(&-2));
        assert_eq!(energy.get(&id("length")), Some(&2));
        assert!(corpus.definition_signature(id("angle")).is_empty());
        assert_eq!(
            corpus.definition_signature(id("speed")),
            corpus.definition_signature(id("velocity"))
        );
    }

    #[test]
    fn test_populate_twice_fails() {
        let mut corpus = bootstrap().unwrap();
        assert!(populate(&mut corpus).is_err());
    }

    #[test]
    fn test_us_customary_nested() {
        let corpus = bootstrap().unwrap();
        let us = corpus.system_id("us-customary").unwrap();
        let imperial = corpus.system_id("imperial").unwrap();
        assert_eq!(corpus.system(us).parent(), Some(imperial));
        assert_eq!(corpus.system_depth(us), 1);
    }
}
