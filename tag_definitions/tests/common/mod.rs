/* Sample tags shared by the integration tests. */

#![allow(dead_code)]

use tag_definitions::*;
use tag_runtime::prelude::*;
use tag_runtime::workload::{Diagnostic, MemoryBundle, MemoryWorkload};

pub const WEAPON: TagClass = TagClass::new(*b"weap");
pub const VEHICLE: TagClass = TagClass::new(*b"vehi");
pub const MODEL: TagClass = TagClass::new(*b"mode");
pub const GBXMODEL: TagClass = TagClass::new(*b"mod2");
pub const SOUND: TagClass = TagClass::new(*b"snd!");
pub const PROJECTILE: TagClass = TagClass::new(*b"proj");
pub const BITMAP: TagClass = TagClass::new(*b"bitm");

pub fn pistol() -> Weapon {
    Weapon {
        object_type: ObjectType::OBJECT_TYPE_WEAPON,
        flags: ObjectFlags(
            ObjectFlags::OBJECT_FLAGS_FLAG_DOES_NOT_CAST_SHADOW.0
                | ObjectFlags::OBJECT_FLAGS_FLAG_NOT_A_PATHFINDING_OBSTACLE.0,
        ),
        bounding_radius: 0.25,
        bounding_offset: Point3D::new(0.0, 0.0, 0.05),
        acceleration_scale: 1.0,
        model: Dependency::new(MODEL, "weapons\\pistol\\pistol"),
        runtime_id: TagId::NULL,
        message_index: 3,
        sort_order: 1,
        pickup_sound: Dependency::null(SOUND),
        label: TagString::new("pistol"),
        zoom_levels: 1,
        zoom_magnification: Bounds::new(1.0, 2.0),
        heat_recovery: 0.5,
        magazines: vec![WeaponMagazine {
            rounds_recharged: 0,
            rounds_total_initial: 36,
            rounds_total_maximum: 120,
            reload_time: 1.5,
        }],
        triggers: vec![WeaponTrigger {
            flags: TriggerFlags::TRIGGER_FLAGS_FLAG_TRACKS_FIRED_PROJECTILE,
            rounds_per_second: Bounds::new(3.0, 5.0),
            magazine: 0,
            rounds_per_shot: 1,
            projectile: Dependency::new(PROJECTILE, "weapons\\pistol\\bullet"),
            damage_category: DamageCategory::DAMAGE_CATEGORY_NONE,
        }],
        runtime_flags: 0,
    }
}

pub fn warthog() -> Vehicle {
    Vehicle {
        object_type: ObjectType::OBJECT_TYPE_VEHICLE,
        bounding_radius: 2.5,
        acceleration_scale: 1.0,
        model: Dependency::new(MODEL, "vehicles\\warthog\\warthog"),
        default_team: Team::TEAM_PLAYER,
        weapons: vec![UnitWeapon {
            weapon: Dependency::new(WEAPON, "vehicles\\warthog\\chaingun"),
        }],
        seats: vec![
            UnitSeat {
                label: TagString::new("driver"),
                yaw_range: Bounds::new(-1.5, 1.5),
            },
            UnitSeat {
                label: TagString::new("gunner"),
                yaw_range: Bounds::new(-3.1, 3.1),
            },
        ],
        predicted_resources: vec![PredictedResource {
            type_: 0,
            resource_index: 4,
            tag: TagId::NULL,
        }],
        maximum_forward_speed: 12.0,
        wheel_axis: Vector3D::new(0.0, 0.0, 1.0),
        suspension_sound: Dependency::null(SOUND),
        ..Default::default()
    }
}

pub fn node(name: &str, parent: u16, first_child: u16) -> ModelNode {
    ModelNode {
        name: TagString::new(name),
        parent_node_index: parent,
        first_child_node_index: first_child,
        default_translation: Point3D::new(0.0, 0.0, 0.1),
        default_rotation: Quaternion::new(0.0, 0.0, 0.0, 1.0),
    }
}

pub fn skeleton() -> Gbxmodel {
    Gbxmodel {
        nodes: vec![node("frame", NULL_INDEX, 1), node("barrel", 0, NULL_INDEX)],
        regions: vec![ModelRegion {
            name: TagString::new("body"),
            permutations: vec![ModelRegionPermutation {
                name: TagString::new("base"),
                node: 1,
            }],
        }],
        detail_cutoff: 1.0,
    }
}

pub fn sprite_sheet() -> Bitmap {
    Bitmap {
        color_plate: vec![1, 2, 3, 4, 5],
        pixel_data: vec![0xAA; 12],
        compressed_color_plate: vec![9, 8, 7],
        tint: ColorRGB::new(1.0, 0.5, 0.25),
        swap_id: 0x1234_5678,
        unused_value: 0,
    }
}

/* Compile `tag` as the base struct of a fresh workload and lay it out */
pub fn build(
    path: &str,
    class: TagClass,
    options: BuildOptions,
    compile: impl FnOnce(&mut MemoryWorkload, usize) -> TagResult<usize>,
) -> (TagResult<MemoryBundle>, Vec<Diagnostic>) {
    let mut workload = MemoryWorkload::new(options);
    let tag = workload.register_tag(path, class);
    let result = compile(&mut workload, tag).and_then(|base| {
        workload.set_base_struct(tag, base)?;
        Ok(())
    });
    let diagnostics = workload.diagnostics.clone();
    (result.and_then(|()| workload.finish(tag)), diagnostics)
}

pub fn build_weapon(weapon: &Weapon, options: BuildOptions) -> (TagResult<MemoryBundle>, Vec<Diagnostic>) {
    build("weapons\\pistol\\pistol", WEAPON, options, |workload, tag| weapon.compile_tag(workload, tag))
}

/* Packed decode fills in tag IDs; clear them so tags compare against their source */
pub fn clear_ids(weapon: &mut Weapon) {
    weapon.model.id = TagId::NULL;
    weapon.pickup_sound.id = TagId::NULL;
    for trigger in &mut weapon.triggers {
        trigger.projectile.id = TagId::NULL;
    }
}

pub fn root_message(err: &TagError) -> String {
    err.root().to_string()
}
