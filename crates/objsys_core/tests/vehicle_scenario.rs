use objsys_core::dispatch::{self, typed_data_mut};
use objsys_core::{Capability, ClassBuilder, ObjectId, ObjectResult, ObjectSystem, Selector};
use std::io::Write;

const CAR_TYPE: &str = "car";
const CAR_DATA: Selector = Selector::new("car.data");
const CAR_WHEELSIZE: Selector = Selector::new("car.wheelsize");

type WheelsizeFn = fn(&mut ObjectSystem, ObjectId) -> ObjectResult<f32>;

struct Wheelsize;

impl Capability for Wheelsize {
    const SELECTOR: Selector = CAR_WHEELSIZE;
    type Implementation = WheelsizeFn;
}

#[derive(Debug, Default)]
struct Car {
    speed: f32,
    wheelsize: f32,
}

fn car_data(system: &mut ObjectSystem, object: ObjectId) -> ObjectResult<&mut Car> {
    typed_data_mut::<Car>(system, object, CAR_TYPE, CAR_DATA)
}

fn car_get_type(_system: &ObjectSystem, _object: ObjectId) -> &'static str {
    CAR_TYPE
}

fn car_initialize(system: &mut ObjectSystem, object: ObjectId) -> ObjectResult<()> {
    let car = car_data(system, object)?;
    car.speed = 0.0;
    car.wheelsize = 17.0;
    Ok(())
}

fn car_write(
    system: &mut ObjectSystem,
    object: ObjectId,
    out: &mut dyn Write,
) -> ObjectResult<()> {
    let car = car_data(system, object)?;
    writeln!(
        out,
        "Car (wheel size {:.6}) speeds at {:.6} km/h",
        car.wheelsize, car.speed
    )?;
    Ok(())
}

fn car_wheelsize_fn(system: &mut ObjectSystem, object: ObjectId) -> ObjectResult<f32> {
    Ok(car_data(system, object)?.wheelsize)
}

fn car_wheelsize(system: &mut ObjectSystem, object: ObjectId) -> ObjectResult<f32> {
    let wheelsize = system.resolve_capability::<Wheelsize>(object)?;
    wheelsize(system, object)
}

fn car_class(system: &mut ObjectSystem, base: ObjectId) -> ObjectResult<ObjectId> {
    ClassBuilder::new()
        .delegate(base)
        .get_type(car_get_type)
        .initialize(car_initialize)
        .write(car_write)
        .capability::<Wheelsize>(car_wheelsize_fn)
        .build(system)
}

#[test]
fn car_writes_expected_description() {
    let mut system = ObjectSystem::new();
    let base = system.alloc();
    let car = car_class(&mut system, base).expect("car class");

    dispatch::initialize(&mut system, car).expect("initialize again");
    let mut out = Vec::new();
    dispatch::write(&mut system, car, &mut out).expect("write car");
    assert_eq!(
        String::from_utf8(out).expect("utf8 output"),
        "Car (wheel size 17.000000) speeds at 0.000000 km/h\n"
    );

    assert_eq!(car_wheelsize(&mut system, car).expect("wheelsize"), 17.0);
    assert!(dispatch::is_type(&system, car, CAR_TYPE).expect("typed"));
}

#[test]
fn car_derivative_inherits_capabilities() {
    let mut system = ObjectSystem::new();
    let base = system.alloc();
    let car = car_class(&mut system, base).expect("car class");
    let derived = system.alloc();
    system.push_delegate(derived, car).expect("derived -> car");
    dispatch::initialize(&mut system, derived).expect("inherited initialize");

    // Inherited code runs against the derived instance's own data slot.
    car_data(&mut system, derived).expect("derived data").speed = 88.0;
    assert_eq!(
        dispatch::describe(&mut system, derived).expect("inherited write"),
        "Car (wheel size 17.000000) speeds at 88.000000 km/h\n"
    );
    assert_eq!(
        dispatch::describe(&mut system, car).expect("car write"),
        "Car (wheel size 17.000000) speeds at 0.000000 km/h\n"
    );
}

#[test]
fn car_teardown_releases_every_registration() {
    let mut system = ObjectSystem::new();
    let base = system.alloc();
    let car = car_class(&mut system, base).expect("car class");
    assert_eq!(system.methods().len(), 4);

    system.free(car).expect("free car");
    system.free(base).expect("free base");
    assert_eq!(system.stats().pool.free, 4);
    system.destroy().expect("system tears down once empty");
}
