/// One row of the tag class table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagClassInfo {
    pub name: &'static str,
    pub fourcc: u32,
    /// File-format version written into the tag header.
    pub version: u16,
}

const fn class(name: &'static str, fourcc: u32, version: u16) -> TagClassInfo {
    TagClassInfo {
        name,
        fourcc,
        version,
    }
}

pub const TAG_CLASSES: &[TagClassInfo] = &[
    class("actor", 0x61637472, 2),
    class("actor_variant", 0x61637476, 1),
    class("antenna", 0x616E7421, 1),
    class("model_animations", 0x616E7472, 4),
    class("biped", 0x62697064, 3),
    class("bitmap", 0x6269746D, 7),
    class("spheroid", 0x626F6F6D, 1),
    class("continuous_damage_effect", 0x63646D67, 1),
    class("model_collision_geometry", 0x636F6C6C, 10),
    class("color_table", 0x636F6C6F, 1),
    class("contrail", 0x636F6E74, 3),
    class("device_control", 0x6374726C, 1),
    class("decal", 0x64656361, 1),
    class("ui_widget_definition", 0x44654C61, 1),
    class("input_device_defaults", 0x64657663, 1),
    class("device", 0x64657669, 1),
    class("detail_object_collection", 0x646F6263, 1),
    class("effect", 0x65666665, 4),
    class("equipment", 0x65716970, 2),
    class("flag", 0x666C6167, 1),
    class("fog", 0x666F6720, 1),
    class("font", 0x666F6E74, 1),
    class("material_effects", 0x666F6F74, 1),
    class("garbage", 0x67617262, 1),
    class("glow", 0x676C7721, 1),
    class("grenade_hud_interface", 0x67726869, 1),
    class("hud_message_text", 0x686D7420, 1),
    class("hud_number", 0x68756423, 1),
    class("hud_globals", 0x68756467, 1),
    class("item", 0x6974656D, 2),
    class("item_collection", 0x69746D63, 0),
    class("damage_effect", 0x6A707421, 6),
    class("lens_flare", 0x6C656E73, 2),
    class("lightning", 0x656C6563, 1),
    class("device_light_fixture", 0x6C696669, 1),
    class("light", 0x6C696768, 3),
    class("sound_looping", 0x6C736E64, 3),
    class("device_machine", 0x6D616368, 1),
    class("globals", 0x6D617467, 3),
    class("meter", 0x6D657472, 1),
    class("light_volume", 0x6D677332, 1),
    class("gbxmodel", 0x6D6F6432, 5),
    class("model", 0x6D6F6465, 4),
    class("multiplayer_scenario_description", 0x6D706C79, 2),
    class("preferences_network_game", 0x6E677072, 1),
    class("object", 0x6F626A65, 1),
    class("particle", 0x70617274, 2),
    class("particle_system", 0x7063746C, 4),
    class("physics", 0x70687973, 4),
    class("placeholder", 0x706C6163, 2),
    class("point_physics", 0x70706879, 1),
    class("projectile", 0x70726F6A, 5),
    class("weather_particle_system", 0x7261696E, 1),
    class("scenario_structure_bsp", 0x73627370, 5),
    class("scenery", 0x7363656E, 1),
    class("shader_transparent_chicago_extended", 0x73636578, 1),
    class("shader_transparent_chicago", 0x73636869, 1),
    class("scenario", 0x73636E72, 2),
    class("shader_environment", 0x73656E76, 2),
    class("shader_transparent_glass", 0x73676C61, 1),
    class("shader", 0x73686472, 1),
    class("sky", 0x736B7920, 1),
    class("shader_transparent_meter", 0x736D6574, 1),
    class("sound", 0x736E6421, 4),
    class("sound_environment", 0x736E6465, 1),
    class("shader_model", 0x736F736F, 2),
    class("shader_transparent_generic", 0x736F7472, 1),
    class("ui_widget_collection", 0x536F756C, 1),
    class("shader_transparent_plasma", 0x73706C61, 1),
    class("sound_scenery", 0x73736365, 1),
    class("string_list", 0x73747223, 1),
    class("shader_transparent_water", 0x73776174, 2),
    class("tag_collection", 0x74616763, 1),
    class("camera_track", 0x7472616B, 1),
    class("dialogue", 0x75646C67, 1),
    class("unit_hud_interface", 0x756E6869, 1),
    class("unit", 0x756E6974, 2),
    class("unicode_string_list", 0x75737472, 1),
    class("virtual_keyboard", 0x76636B79, 2),
    class("vehicle", 0x76656869, 1),
    class("weapon", 0x77656170, 2),
    class("wind", 0x77696E64, 1),
    class("weapon_hud_interface", 0x77706869, 2),
];

pub const NULL_CLASS_NAME: &str = "null";
pub const NONE_CLASS_NAME: &str = "none";

pub fn class_by_name(name: &str) -> Option<&'static TagClassInfo> {
    TAG_CLASSES.iter().find(|c| c.name == name)
}

pub fn class_by_fourcc(fourcc: u32) -> Option<&'static TagClassInfo> {
    TAG_CLASSES.iter().find(|c| c.fourcc == fourcc)
}

pub fn version_for_class(name: &str) -> Option<u16> {
    class_by_name(name).map(|c| c.version)
}

/// Shorthand class names accepted in dependency class lists, with their members.
pub const SUPERCLASSES: &[(&str, &[&str])] = &[
    (
        "object",
        &[
            "biped",
            "vehicle",
            "weapon",
            "equipment",
            "garbage",
            "projectile",
            "scenery",
            "device_machine",
            "device_control",
            "device_light_fixture",
            "placeholder",
            "sound_scenery",
        ],
    ),
    ("unit", &["biped", "vehicle"]),
    ("item", &["weapon", "equipment", "garbage"]),
    (
        "device",
        &["device_machine", "device_control", "device_light_fixture"],
    ),
    (
        "shader",
        &[
            "shader_environment",
            "shader_model",
            "shader_transparent_chicago",
            "shader_transparent_chicago_extended",
            "shader_transparent_generic",
            "shader_transparent_glass",
            "shader_transparent_meter",
            "shader_transparent_plasma",
            "shader_transparent_water",
        ],
    ),
];

pub fn superclass_members(name: &str) -> Option<&'static [&'static str]> {
    SUPERCLASSES
        .iter()
        .find(|(superclass, _)| *superclass == name)
        .map(|(_, members)| *members)
}
