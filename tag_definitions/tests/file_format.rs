/* File Format Tests
 *
 * Round trips through the big-endian tag file format, header checks and the
 * postprocess defaults applied on decode.
 */

mod common;

use common::*;
use tag_definitions::*;
use tag_runtime::prelude::*;

fn body(file: &[u8]) -> &[u8] {
    &file[TagFileHeader::SIZE..]
}

#[test]
fn test_weapon_round_trip() {
    let pistol = pistol();
    let file = pistol.generate_file(WEAPON).unwrap();
    let parsed = Weapon::parse_file(&file, Some(WEAPON), true).unwrap();

    /* object type is cache only and never reaches tag files */
    let expected = Weapon {
        object_type: ObjectType::default(),
        ..pistol
    };
    assert_eq!(parsed, expected);
    assert_eq!(parsed.title().as_deref(), Some("pistol"));
}

#[test]
fn test_weapon_file_layout_is_big_endian() {
    let file = pistol().generate_file(WEAPON).unwrap();

    assert_eq!(&file[36..40], b"weap");
    assert_eq!(&file[60..64], b"blam");
    assert_eq!(u16::from_be_bytes([file[56], file[57]]), 2);

    let data = body(&file);
    assert_eq!(&data[4..8], &0.25f32.to_be_bytes());
    assert_eq!(&data[100..102], &1i16.to_be_bytes());
    /* magazines: count 1 */
    assert_eq!(&data[116..120], &1u32.to_be_bytes());
    /* variable data starts with the model path right after the fixed struct */
    assert_eq!(&data[144..166], b"weapons\\pistol\\pistol\0");
}

#[test]
fn test_nested_arrays_round_trip() {
    let model = skeleton();
    let file = model.generate_file(GBXMODEL).unwrap();
    let parsed = Gbxmodel::parse_file(&file, Some(GBXMODEL), true).unwrap();
    assert_eq!(parsed, model);
    assert_eq!(parsed.regions[0].permutations[0].node, 1);
}

#[test]
fn test_cache_only_data_is_left_out() {
    let mut pistol = pistol();
    pistol.runtime_flags = 7;
    pistol.flags.set(ObjectFlags::OBJECT_FLAGS_FLAG_CACHE_DIRTY, true);

    let file = pistol.generate_file(WEAPON).unwrap();
    let data = body(&file);
    assert_eq!(&data[0..2], &[0, 0]);
    assert_eq!(&data[140..144], &[0, 0, 0, 0]);

    let parsed = Weapon::parse_file(&file, Some(WEAPON), false).unwrap();
    assert_eq!(parsed.runtime_flags, 0);
    assert!(!parsed.flags.contains(ObjectFlags::OBJECT_FLAGS_FLAG_CACHE_DIRTY));
    assert!(parsed.flags.contains(ObjectFlags::OBJECT_FLAGS_FLAG_DOES_NOT_CAST_SHADOW));

    let warthog = warthog();
    let parsed = Vehicle::parse_file(&warthog.generate_file(VEHICLE).unwrap(), Some(VEHICLE), true).unwrap();
    assert!(parsed.predicted_resources.is_empty());
    assert_eq!(
        parsed,
        Vehicle {
            object_type: ObjectType::default(),
            predicted_resources: Vec::new(),
            ..warthog
        }
    );
}

#[test]
fn test_tag_ids_decode_as_null() {
    let mut pistol = pistol();
    pistol.runtime_id = TagId(0x0001_0002);
    let file = pistol.generate_file(WEAPON).unwrap();
    let parsed = Weapon::parse_file(&file, Some(WEAPON), true).unwrap();
    assert_eq!(parsed.runtime_id, TagId::NULL);
}

#[test]
fn test_stray_bitfield_bits_are_masked_on_decode() {
    let mut data = pistol().generate_file_data().unwrap();
    data[2..4].copy_from_slice(&[0xFF, 0xFF]);
    let file = TagFileHeader::wrap(WEAPON, &data);

    let parsed = Weapon::parse_file(&file, Some(WEAPON), false).unwrap();
    assert_eq!(parsed.flags.0, ObjectFlags::MASK & !ObjectFlags::CACHE_ONLY_MASK);
    assert!(!parsed.flags.contains(ObjectFlags::OBJECT_FLAGS_FLAG_CACHE_DIRTY));

    /* the stray bits do not reach packed data either */
    let (bundle, _) = build_weapon(&parsed, BuildOptions::default());
    let compiled = Weapon::parse_packed_data(&bundle.unwrap(), None).unwrap();
    assert_eq!(compiled.flags.0, 0x000f);
}

#[test]
fn test_postprocess_applies_defaults() {
    let mut weapon = Weapon::default();
    weapon.magazines.push(WeaponMagazine::default());
    let file = weapon.generate_file(WEAPON).unwrap();

    let raw = Weapon::parse_file(&file, Some(WEAPON), false).unwrap();
    assert_eq!(raw.acceleration_scale, 0.0);
    assert_eq!(raw.zoom_magnification, Bounds::new(0.0, 0.0));
    assert_eq!(raw.magazines[0].reload_time, 0.0);

    let processed = Weapon::parse_file(&file, Some(WEAPON), true).unwrap();
    assert_eq!(processed.acceleration_scale, 1.0);
    assert_eq!(processed.zoom_magnification, Bounds::new(1.0, 2.0));
    assert_eq!(processed.magazines[0].reload_time, 1.5);
    /* unset dependencies come back carrying their first allowed class */
    assert_eq!(processed.model, Dependency::null(MODEL));
}

#[test]
fn test_postprocess_respects_default_sign() {
    let mut weapon = pistol();
    weapon.zoom_magnification = Bounds::new(-1.0, -0.5);
    let file = weapon.generate_file(WEAPON).unwrap();
    let parsed = Weapon::parse_file(&file, Some(WEAPON), true).unwrap();
    assert_eq!(parsed.zoom_magnification, Bounds::new(1.0, 2.0));

    weapon.zoom_magnification = Bounds::new(0.0, 3.0);
    let file = weapon.generate_file(WEAPON).unwrap();
    let parsed = Weapon::parse_file(&file, Some(WEAPON), true).unwrap();
    assert_eq!(parsed.zoom_magnification, Bounds::new(0.0, 3.0));
}

#[test]
fn test_compound_defaults() {
    let file = Vehicle::default().generate_file(VEHICLE).unwrap();
    let parsed = Vehicle::parse_file(&file, Some(VEHICLE), true).unwrap();
    assert_eq!(parsed.wheel_axis, Vector3D::new(0.0, 0.0, 1.0));
    assert_eq!(parsed.acceleration_scale, 1.0);

    let file = Bitmap::default().generate_file(BITMAP).unwrap();
    let parsed = Bitmap::parse_file(&file, Some(BITMAP), true).unwrap();
    assert_eq!(parsed.tint, ColorRGB::new(1.0, 1.0, 1.0));
}

#[test]
fn test_blobs_and_endian_overrides() {
    let mut bitmap = sprite_sheet();
    bitmap.unused_value = 99;
    let file = bitmap.generate_file(BITMAP).unwrap();
    let data = body(&file);

    assert_eq!(data.len(), 80 + 5 + 12 + 3);
    assert_eq!(&data[72..76], &0x1234_5678u32.to_le_bytes());
    assert_eq!(&data[80..85], &[1, 2, 3, 4, 5]);

    let parsed = Bitmap::parse_file(&file, Some(BITMAP), true).unwrap();
    assert_eq!(
        parsed,
        Bitmap {
            unused_value: 0,
            ..bitmap
        }
    );
}

#[test]
fn test_header_class_mismatch() {
    let file = pistol().generate_file(WEAPON).unwrap();
    let err = Weapon::parse_file(&file, Some(GBXMODEL), true).unwrap_err();
    assert_eq!(err.to_string(), "invalid tag data: tag file is a weapon tag, expected gbxmodel");

    /* no expected class accepts anything */
    Weapon::parse_file(&file, None, true).unwrap();
}

#[test]
fn test_header_corruption() {
    let file = pistol().generate_file(WEAPON).unwrap();

    let mut flipped = file.clone();
    let last = flipped.len() - 1;
    flipped[last] ^= 0xFF;
    let err = Weapon::parse_file(&flipped, Some(WEAPON), true).unwrap_err();
    assert!(matches!(err, TagError::InvalidTagData(_)));
    assert!(err.to_string().contains("checksum mismatch"));

    let mut no_blam = file.clone();
    no_blam[60] = 0;
    let err = Weapon::parse_file(&no_blam, Some(WEAPON), true).unwrap_err();
    assert_eq!(err.to_string(), "invalid tag data: tag file header is missing blam");

    let err = Weapon::parse_file(&file[..0x20], Some(WEAPON), true).unwrap_err();
    assert!(matches!(err, TagError::OutOfBounds(_)));
}

#[test]
fn test_truncated_data() {
    let file = pistol().generate_file(WEAPON).unwrap();
    let data = body(&file);
    let truncated = TagFileHeader::wrap(WEAPON, &data[..data.len() - 4]);

    /* the projectile path of the only trigger is the last thing in the file */
    let err = Weapon::parse_file(&truncated, Some(WEAPON), true).unwrap_err();
    assert_eq!(err.to_string(), "failed to parse Weapon::triggers #0");
    assert!(matches!(err.root(), TagError::OutOfBounds(_)));

    let short = TagFileHeader::wrap(WEAPON, &data[..100]);
    assert!(matches!(
        Weapon::parse_file(&short, Some(WEAPON), true).unwrap_err(),
        TagError::OutOfBounds(_)
    ));
}

#[test]
fn test_leftover_data() {
    let file = pistol().generate_file(WEAPON).unwrap();
    let mut data = body(&file).to_vec();
    data.extend_from_slice(&[0, 0, 0, 0]);
    let padded = TagFileHeader::wrap(WEAPON, &data);

    let err = Weapon::parse_file(&padded, Some(WEAPON), true).unwrap_err();
    assert!(matches!(err, TagError::InvalidTagData(_)));
    assert!(err.to_string().contains("left over"));
}
