use super::*;

#[test]
fn catalogue_has_twenty_five_unique_ids() {
    let mut ids: Vec<&str> = CaptionPreset::ALL.iter().map(|p| p.id()).collect();
    assert_eq!(ids.len(), 25);
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 25);
}

#[test]
fn ids_round_trip_through_from_id_and_serde() {
    for preset in CaptionPreset::ALL {
        assert_eq!(CaptionPreset::from_id(preset.id()), Some(preset));
        let json = serde_json::to_string(&preset).unwrap();
        assert_eq!(json, format!("\"{}\"", preset.id()));
    }
}

#[test]
fn unknown_id_is_a_validation_error() {
    let err = "sparkly".parse::<CaptionPreset>().unwrap_err();
    assert!(err.to_string().contains("unknown caption style"));
}

#[test]
fn classic_has_outline_and_translucent_shadow() {
    let s = CaptionPreset::Classic.style();
    assert_eq!(s.text_color, Color::WHITE);
    assert_eq!(s.font_weight, 700);
    assert_eq!(
        s.stroke,
        Some(Stroke {
            color: Color::BLACK,
            width: 0.1
        })
    );
    let shadow = s.shadow.unwrap();
    assert_eq!(shadow.color.a, 128);
    assert_eq!((shadow.blur, shadow.offset_x, shadow.offset_y), (4.0, 0.0, 2.0));
    assert!(s.background.is_none());
}

#[test]
fn neon_presets_glow_in_stroke_color() {
    for preset in [
        CaptionPreset::NeonBlue,
        CaptionPreset::NeonPink,
        CaptionPreset::NeonGreen,
    ] {
        let s = preset.style();
        assert!(s.neon);
        let stroke = s.stroke.unwrap();
        assert_eq!(s.shadow.unwrap().color, stroke.color);
    }
    assert!(!CaptionPreset::Classic.style().neon);
}

#[test]
fn box_presets_carry_padding_and_radius() {
    let vlog = CaptionPreset::Vlog.style().background.unwrap();
    assert_eq!((vlog.padding, vlog.radius), (0.4, 0.5));
    let typewriter = CaptionPreset::Typewriter.style().background.unwrap();
    assert_eq!(typewriter.padding, DEFAULT_BACKGROUND_PADDING);
    assert_eq!(typewriter.radius, 0.0);
}

#[test]
fn italic_presets_are_serif() {
    assert!(CaptionPreset::Cinematic.style().italic);
    assert!(CaptionPreset::Luxury.style().italic);
    assert!(!CaptionPreset::Comic.style().italic);
}

#[test]
fn style_building_is_pure() {
    assert_eq!(CaptionPreset::Retro.style(), CaptionPreset::Retro.style());
}
