//! Car extension used by the demo.

use objsys_core::dispatch::typed_data_mut;
use objsys_core::{Capability, ClassBuilder, ObjectId, ObjectResult, ObjectSystem, Selector};
use std::io::Write;

pub const CAR_TYPE: &str = "car";
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

fn get_type_fn(_system: &ObjectSystem, _object: ObjectId) -> &'static str {
    CAR_TYPE
}

fn initialize_fn(system: &mut ObjectSystem, object: ObjectId) -> ObjectResult<()> {
    log::debug!("event=car_initialize module=vehicle status=ok object={object}");
    let car = car_data(system, object)?;
    car.speed = 0.0;
    car.wheelsize = 17.0;
    Ok(())
}

fn write_fn(
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

fn wheelsize_fn(system: &mut ObjectSystem, object: ObjectId) -> ObjectResult<f32> {
    Ok(car_data(system, object)?.wheelsize)
}

/// Builds a car on top of `base` and initializes it.
pub fn car_class(system: &mut ObjectSystem, base: ObjectId) -> ObjectResult<ObjectId> {
    ClassBuilder::new()
        .delegate(base)
        .get_type(get_type_fn)
        .initialize(initialize_fn)
        .write(write_fn)
        .capability::<Wheelsize>(wheelsize_fn)
        .build(system)
}

pub fn car_wheelsize(system: &mut ObjectSystem, object: ObjectId) -> ObjectResult<f32> {
    let wheelsize = system.resolve_capability::<Wheelsize>(object)?;
    wheelsize(system, object)
}

#[cfg(test)]
mod tests {
    use super::{car_class, car_wheelsize};
    use objsys_core::{dispatch, object_class, ObjectSystem};

    #[test]
    fn car_on_root_class_describes_itself() {
        let mut system = ObjectSystem::new();
        let root = object_class(&mut system).expect("root class");
        let car = car_class(&mut system, root).expect("car class");

        assert_eq!(
            dispatch::describe(&mut system, car).expect("describe"),
            "Car (wheel size 17.000000) speeds at 0.000000 km/h\n"
        );
        assert_eq!(car_wheelsize(&mut system, car).expect("wheelsize"), 17.0);
        assert!(dispatch::is_type(&system, root, "object").expect("root type"));
    }
}
