//! Paint application: persisted record -> live render slots.

use paint_shop_shared::{
    finish, LivePaint, PaintShopSync, PaintState, PreviewPaint, PurchasePaint, Rgb, Tuning,
    VehicleColor, VehicleRecord,
};

/// Write the record's colours onto the live vehicle.
///
/// No-op without tuning. When only one of primary/secondary is set the other
/// renders as a copy of it; the record itself is left as stored.
/// Pearl and finish are not touched here.
pub fn apply_paint(record: &VehicleRecord, live: &mut LivePaint) -> bool {
    if record.tuning.is_none() {
        return false;
    }

    let (primary, secondary) = mirrored_colors(&record.state);
    if let Some(color) = primary {
        live.set_primary(color);
    }
    if let Some(color) = secondary {
        live.set_secondary(color);
    }
    true
}

fn mirrored_colors(state: &PaintState) -> (Option<VehicleColor>, Option<VehicleColor>) {
    match (state.primary_color, state.secondary_color) {
        (Some(primary), None) => (Some(primary), Some(primary)),
        (None, Some(secondary)) => (Some(secondary), Some(secondary)),
        colors => colors,
    }
}

/// Put the live vehicle back to exactly what was last purchased, dropping any preview.
/// A vehicle that was never tuned goes back to factory paint.
pub fn restore_persisted_paint(record: &VehicleRecord, live: &mut LivePaint) {
    if !apply_paint(record, live) {
        *live = LivePaint::default();
        return;
    }

    let state = &record.state;
    if let Some(pearl) = state.pearl_color {
        live.pearl_color = pearl;
    }
    // Finish codes share the index slot, so they only apply over a custom colour
    if let (Some(finish), Some(_)) = (state.primary_finish, live.custom_primary) {
        live.primary_color = finish;
    }
    if let (Some(finish), Some(_)) = (state.secondary_finish, live.custom_secondary) {
        live.secondary_color = finish;
    }
}

/// Take a preview off a vehicle. Without a record the vehicle goes back to factory paint.
pub fn discard_preview(record: Option<&VehicleRecord>, live: &mut LivePaint) {
    match record {
        Some(record) => restore_persisted_paint(record, live),
        None => *live = LivePaint::default(),
    }
}

/// Show a preview on the live vehicle. Never touches the record.
pub fn apply_preview(live: &mut LivePaint, preview: &PreviewPaint) {
    match preview.color {
        VehicleColor::Palette(_) => {
            live.set_primary(preview.color);
            live.set_secondary(preview.color2);
        }
        VehicleColor::Custom(_) => {
            live.primary_color = preview.finish1;
            live.secondary_color = preview.finish2;
            live.set_primary(preview.color);
            live.set_secondary(preview.color2);

            if preview.pearl >= 0 {
                live.pearl_color = preview.pearl.min(u8::MAX as i16) as u8;
            }
        }
    }
}

/// Commit the supplied fields of a purchase to the record. Returns whether any field was supplied.
pub fn commit_purchase(record: &mut VehicleRecord, purchase: &PurchasePaint) -> bool {
    let state = &mut record.state;

    if let Some(color) = purchase.color {
        state.primary_color = Some(color);
    }
    if let Some(color) = purchase.color2 {
        state.secondary_color = Some(color);
    }
    if let Some(finish) = purchase.finish1 {
        state.primary_finish = Some(finish);
    }
    if let Some(finish) = purchase.finish2 {
        state.secondary_finish = Some(finish);
    }
    if let Some(pearl) = purchase.pearl {
        state.pearl_color = Some(pearl);
    }

    let touched = purchase.color.is_some()
        || purchase.color2.is_some()
        || purchase.finish1.is_some()
        || purchase.finish2.is_some()
        || purchase.pearl.is_some();
    if touched && record.tuning.is_none() {
        record.tuning = Some(Tuning);
    }

    touched
}

/// Snapshot of the paint the vehicle shows, for the shop UI.
/// A lone colour is mirrored as on the live vehicle. Unset or palette colours show as white.
pub fn sync_payload(record: &VehicleRecord) -> PaintShopSync {
    let state = &record.state;
    let (primary, secondary) = mirrored_colors(state);
    PaintShopSync {
        color: primary.and_then(|c| c.as_rgb()).unwrap_or(Rgb::WHITE),
        color2: secondary.and_then(|c| c.as_rgb()).unwrap_or(Rgb::WHITE),
        pearl: state.pearl_color.unwrap_or(0),
        finish1: state.primary_finish.unwrap_or(finish::MATTE),
        finish2: state.secondary_finish.unwrap_or(finish::MATTE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paint_shop_shared::VehicleType;

    fn tuned_record() -> VehicleRecord {
        let mut record = VehicleRecord::new("car-1", "alice", VehicleType::Car, [0.0; 3]);
        record.tuning = Some(Tuning);
        record
    }

    #[test]
    fn test_apply_paint_requires_tuning() {
        let mut record = tuned_record();
        record.tuning = None;
        record.state.primary_color = Some(VehicleColor::Palette(4));

        let mut live = LivePaint::default();
        assert!(!apply_paint(&record, &mut live));
        assert_eq!(live, LivePaint::default());
    }

    #[test]
    fn test_single_color_is_mirrored_on_live() {
        let red = VehicleColor::Custom(Rgb::new(200, 0, 0));

        let mut record = tuned_record();
        record.state.primary_color = Some(red);
        let mut live = LivePaint::default();
        apply_paint(&record, &mut live);
        assert_eq!(live.custom_primary, Some(Rgb::new(200, 0, 0)));
        assert_eq!(live.custom_secondary, Some(Rgb::new(200, 0, 0)));
        // Stored state is untouched
        assert_eq!(record.state.secondary_color, None);

        let mut record = tuned_record();
        record.state.secondary_color = Some(VehicleColor::Palette(9));
        let mut live = LivePaint::default();
        apply_paint(&record, &mut live);
        assert_eq!(live.primary_color, 9);
        assert_eq!(live.secondary_color, 9);
    }

    #[test]
    fn test_apply_paint_leaves_pearl_alone() {
        let mut record = tuned_record();
        record.state.primary_color = Some(VehicleColor::Palette(1));
        record.state.pearl_color = Some(5);

        let mut live = LivePaint { pearl_color: 2, ..Default::default() };
        apply_paint(&record, &mut live);
        assert_eq!(live.pearl_color, 2);
    }

    #[test]
    fn test_preview_palette_mode() {
        let mut live = LivePaint {
            custom_primary: Some(Rgb::WHITE),
            ..Default::default()
        };
        apply_preview(&mut live, &PreviewPaint::palette(27, 28));

        assert_eq!(live.primary_color, 27);
        assert_eq!(live.secondary_color, 28);
        assert_eq!(live.custom_primary, None);
    }

    #[test]
    fn test_preview_custom_mode() {
        let mut live = LivePaint { pearl_color: 4, ..Default::default() };
        let mut preview = PreviewPaint {
            color: Rgb::new(1, 2, 3).into(),
            color2: Rgb::new(4, 5, 6).into(),
            finish1: finish::METALLIC,
            finish2: finish::CHROME,
            pearl: -1,
        };

        apply_preview(&mut live, &preview);
        assert_eq!(live.primary_color, finish::METALLIC);
        assert_eq!(live.secondary_color, finish::CHROME);
        assert_eq!(live.custom_primary, Some(Rgb::new(1, 2, 3)));
        assert_eq!(live.custom_secondary, Some(Rgb::new(4, 5, 6)));
        // Negative pearl leaves the slot alone
        assert_eq!(live.pearl_color, 4);

        preview.pearl = 0;
        apply_preview(&mut live, &preview);
        assert_eq!(live.pearl_color, 0);
    }

    #[test]
    fn test_commit_only_supplied_fields() {
        let mut record = VehicleRecord::new("car-1", "alice", VehicleType::Car, [0.0; 3]);
        record.state.secondary_color = Some(VehicleColor::Palette(3));

        let changed = commit_purchase(
            &mut record,
            &PurchasePaint {
                color: Some(Rgb::new(10, 20, 30).into()),
                color2: None,
                finish1: Some(0),
                finish2: Some(0),
                pearl: Some(3),
            },
        );

        assert!(changed);
        assert!(record.tuning.is_some());
        assert_eq!(record.state.primary_color, Some(VehicleColor::Custom(Rgb::new(10, 20, 30))));
        assert_eq!(record.state.secondary_color, Some(VehicleColor::Palette(3)));
        assert_eq!(record.state.pearl_color, Some(3));
        assert_eq!(record.state.primary_finish, Some(0));
    }

    #[test]
    fn test_empty_purchase_changes_nothing() {
        let mut record = VehicleRecord::new("car-1", "alice", VehicleType::Car, [0.0; 3]);
        assert!(!commit_purchase(&mut record, &PurchasePaint::default()));
        assert!(record.tuning.is_none());
    }

    #[test]
    fn test_restore_discards_preview() {
        let mut record = tuned_record();
        record.state.primary_color = Some(Rgb::new(10, 20, 30).into());
        record.state.primary_finish = Some(finish::METALLIC);
        record.state.pearl_color = Some(3);

        let mut live = LivePaint::default();
        apply_preview(&mut live, &PreviewPaint::palette(50, 51));
        restore_persisted_paint(&record, &mut live);

        assert_eq!(live.custom_primary, Some(Rgb::new(10, 20, 30)));
        assert_eq!(live.custom_secondary, Some(Rgb::new(10, 20, 30)));
        assert_eq!(live.primary_color, finish::METALLIC);
        assert_eq!(live.pearl_color, 3);
    }

    #[test]
    fn test_restore_untuned_vehicle_to_factory_paint() {
        let record = VehicleRecord::new("car-1", "alice", VehicleType::Car, [0.0; 3]);
        let mut live = LivePaint::default();
        apply_preview(&mut live, &PreviewPaint::palette(50, 51));

        restore_persisted_paint(&record, &mut live);
        assert_eq!(live, LivePaint::default());
    }

    #[test]
    fn test_discard_preview_without_record() {
        let mut live = LivePaint::default();
        apply_preview(&mut live, &PreviewPaint::palette(50, 51));

        discard_preview(None, &mut live);
        assert_eq!(live, LivePaint::default());
    }

    #[test]
    fn test_sync_defaults() {
        let sync = sync_payload(&tuned_record());
        assert_eq!(sync.color, Rgb::WHITE);
        assert_eq!(sync.color2, Rgb::WHITE);
        assert_eq!(sync.pearl, 0);
        assert_eq!(sync.finish1, finish::MATTE);

        let mut record = tuned_record();
        record.state.primary_color = Some(Rgb::new(1, 1, 1).into());
        record.state.secondary_color = Some(VehicleColor::Palette(7));
        record.state.pearl_color = Some(12);
        let sync = sync_payload(&record);
        assert_eq!(sync.color, Rgb::new(1, 1, 1));
        assert_eq!(sync.color2, Rgb::WHITE);
        assert_eq!(sync.pearl, 12);
    }

    #[test]
    fn test_sync_mirrors_lone_color() {
        let mut record = tuned_record();
        record.state.primary_color = Some(Rgb::new(10, 20, 30).into());
        let sync = sync_payload(&record);
        assert_eq!(sync.color2, Rgb::new(10, 20, 30));

        let mut record = tuned_record();
        record.state.secondary_color = Some(Rgb::new(4, 5, 6).into());
        let sync = sync_payload(&record);
        assert_eq!(sync.color, Rgb::new(4, 5, 6));
        assert_eq!(sync.color2, Rgb::new(4, 5, 6));
    }
}
