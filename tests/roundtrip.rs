//! Integration tests for encoding and decoding RSM files across versions.

use rsm::mesh::LegacyTransform;
use rsm::prelude::*;
use rsm::util::{Quat, Vec3};

use tempfile::NamedTempFile;

/// Every version where the layout changes, plus the first and last supported.
const VERSIONS: [(u8, u8); 9] = [(1, 0), (1, 1), (1, 2), (1, 3), (1, 4), (1, 5), (1, 6), (2, 2), (2, 3)];

/// A document that uses every field, whether or not `version` stores it.
fn sample(version: Version) -> Document {
    let mut doc = Document::new(version);
    doc.header.anim_len = 90;
    doc.header.shade_type = ShadeType::Flat;
    doc.header.alpha = 200;
    doc.header.frame_rate = if version.is_rsm2() { 25.0 } else { 0.0 };
    doc.header.reserved = [7; 16];
    doc.root_names = vec!["base".into()];
    if version < Version::V2_3 {
        doc.textures = vec!["wall.bmp".into(), "roof.bmp".into(), "glass.tga".into()];
    }

    let mut base = MeshNode::new("base");
    base.transform = [0.0, 0.0, -1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0];
    base.anchor = Vec3::new(1.0, -2.0, 3.5);
    base.vertices = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(4.0, 0.0, 4.0),
        Vec3::new(0.0, 0.0, 4.0),
    ];
    base.texture_vertices = vec![
        TextureVertex { color: 0xFF80_4020, u: 0.0, v: 0.0 },
        TextureVertex::new(1.0, 0.0),
        TextureVertex::new(1.0, 1.0),
    ];
    let mut f0 = Face::new([0, 1, 2], [0, 1, 2], 0);
    f0.two_side = 1;
    f0.padding = 0x0102;
    let mut f1 = Face::new([0, 2, 3], [0, 2, 1], 1);
    if version >= Version::V2_2 {
        f1.smooth_groups = smallvec::smallvec![3, 4, 5];
    } else if version < Version::V1_2 {
        f0.smooth_groups.clear();
        f1.smooth_groups.clear();
    }
    base.faces = vec![f0, f1];
    base.rotation_key_frames = vec![
        RotationKeyFrame { frame: 0, rotation: Quat::IDENTITY },
        RotationKeyFrame { frame: 60, rotation: Quat::from_rotation_y(1.2) },
    ];

    let mut door = MeshNode::new("door").with_parent("base");
    door.anchor = Vec3::new(2.0, 0.0, 0.0);
    door.vertices = vec![Vec3::ZERO, Vec3::Y, Vec3::X];
    door.texture_vertices = vec![TextureVertex::new(0.5, 0.5)];
    door.faces = vec![Face::new([0, 1, 2], [0, 0, 0], 0)];
    door.legacy = LegacyTransform {
        position: Vec3::new(0.5, 0.5, 0.5),
        rot_angle: 0.25,
        rot_axis: Vec3::Y,
        scale: Vec3::new(1.0, 2.0, 1.0),
    };

    if version >= Version::V2_3 {
        base.textures = vec!["wall.bmp".into(), "glass.tga".into()];
        base.texture_indexes = vec![0, 1];
        door.textures = vec!["roof.bmp".into()];
        door.texture_indexes = vec![0];
        door.texture_key_frames.add_key_frame(0, 0, TextureKeyFrame { frame: 0, offset: 0.0 });
        door.texture_key_frames.add_key_frame(0, 0, TextureKeyFrame { frame: 30, offset: 1.0 });
        door.texture_key_frames.add_key_frame(0, 4, TextureKeyFrame { frame: 10, offset: 0.5 });
    } else {
        base.texture_indexes = vec![0, 2];
        door.texture_indexes = vec![1];
    }

    if version >= Version::V1_6 {
        door.scale_key_frames = vec![
            ScaleKeyFrame { frame: 0, scale: Vec3::ONE, data: 0.0 },
            ScaleKeyFrame { frame: 45, scale: Vec3::splat(2.0), data: 1.5 },
        ];
    }
    if version.is_rsm2() {
        door.position_key_frames = vec![PositionKeyFrame { frame: 5, position: Vec3::new(2.0, 1.0, 0.0), data: 3 }];
    }
    if version < Version::new(1, 5) {
        doc.position_key_frames = vec![PositionKeyFrame { frame: 12, position: Vec3::new(0.0, 1.0, 0.0), data: 0 }];
    }

    doc.meshes = vec![base, door];
    doc.volume_boxes = vec![VolumeBox {
        size: Vec3::new(4.0, 1.0, 4.0),
        position: Vec3::new(2.0, 0.5, 2.0),
        rotation: Vec3::ZERO,
        flag: if version >= Version::new(1, 3) { 1 } else { 0 },
    }];
    doc.resolve_hierarchy().expect("resolve hierarchy");
    doc
}

#[test]
fn test_roundtrip_every_version() {
    for (major, minor) in VERSIONS {
        let version = Version::new(major, minor);
        let bytes = sample(version).encode().expect("encode sample");
        let doc = Document::decode(&bytes).unwrap_or_else(|e| panic!("decode {version}: {e}"));

        assert_eq!(doc.version(), version);
        assert!(doc.warnings().is_empty(), "{version}: {:?}", doc.warnings());
        assert_eq!(doc.encode().expect("re-encode"), bytes, "byte mismatch for {version}");
    }
}

#[test]
fn test_decoded_fields_follow_version() {
    let v11 = Document::decode(&sample(Version::new(1, 1)).encode().expect("encode")).expect("decode 1.1");
    assert_eq!(v11.header.alpha, 255);
    assert_eq!(v11.header.frame_rate, 0.0);
    assert_eq!(v11.header.reserved, [7; 16]);
    assert_eq!(v11.meshes[0].texture_vertices[0].color, 0xFFFF_FFFF);
    assert!(v11.meshes[0].faces[0].smooth_groups.is_empty());
    assert_eq!(v11.volume_boxes[0].flag, 0);
    assert_eq!(v11.position_key_frames.len(), 1);
    assert_eq!(v11.root_names, vec!["base".to_string()]);
    assert_eq!(v11.meshes[1].legacy.scale, Vec3::new(1.0, 2.0, 1.0));

    let v14 = Document::decode(&sample(Version::new(1, 4)).encode().expect("encode")).expect("decode 1.4");
    assert_eq!(v14.header.alpha, 200);
    assert_eq!(v14.meshes[0].texture_vertices[0].color, 0xFF80_4020);
    assert_eq!(v14.volume_boxes[0].flag, 1);
    assert!(v14.meshes[1].scale_key_frames.is_empty());

    let v16 = Document::decode(&sample(Version::new(1, 6)).encode().expect("encode")).expect("decode 1.6");
    assert_eq!(v16.meshes[1].scale_key_frames.len(), 2);
    assert!(v16.position_key_frames.is_empty());
    assert!(v16.meshes[1].position_key_frames.is_empty());

    let v22 = Document::decode(&sample(Version::V2_2).encode().expect("encode")).expect("decode 2.2");
    assert_eq!(v22.header.frame_rate, 25.0);
    assert_eq!(v22.meshes[0].faces[1].smooth_groups.as_slice(), &[3, 4, 5]);
    assert_eq!(v22.meshes[1].position_key_frames[0].data, 3);
    assert_eq!(v22.meshes[1].legacy, LegacyTransform::default());
    assert_eq!(v22.texture_name(0, 1), Some("glass.tga"));

    let v23 = Document::decode(&sample(Version::V2_3).encode().expect("encode")).expect("decode 2.3");
    assert!(v23.textures.is_empty());
    assert_eq!(v23.meshes[1].textures, vec!["roof.bmp".to_string()]);
    assert_eq!(v23.meshes[1].texture_key_frames.types(), vec![0, 4]);
    assert_eq!(v23.texture_name(0, 1), Some("glass.tga"));
}

#[test]
fn test_hierarchy_resolved_on_decode() {
    let doc = Document::decode(&sample(Version::V2_2).encode().expect("encode")).expect("decode");
    assert_eq!(doc.meshes[1].parent(), Some(0));
    assert_eq!(doc.children(0).expect("children"), &[1]);
    assert_eq!(doc.roots(), vec![0]);
    assert_eq!(doc.root_index(), Some(0));
}

#[test]
fn test_missing_volume_block_preserved() {
    let mut doc = sample(Version::V2_3);
    doc.volume_boxes.clear();
    let mut bytes = doc.encode().expect("encode");
    // Drop the zero box count.
    bytes.truncate(bytes.len() - 4);

    let back = Document::decode(&bytes).expect("decode without volume block");
    assert!(back.volume_boxes.is_empty());
    assert_eq!(back.encode().expect("re-encode"), bytes);
}

#[test]
fn test_truncation_always_fails() {
    let bytes = sample(Version::V2_3).encode().expect("encode");
    // A cut right before the volume block is a valid file without one.
    let volume_start = bytes.len() - 4 - VolumeBox::SIZE;
    for cut in (0..volume_start).chain(volume_start + 1..bytes.len()) {
        assert!(Document::decode(&bytes[..cut]).is_err(), "prefix of {cut} bytes decoded");
    }
}

#[test]
fn test_header_errors() {
    let mut bytes = sample(Version::V2_2).encode().expect("encode");
    bytes[5] = 9;
    assert!(matches!(
        Document::decode(&bytes),
        Err(Error::UnsupportedVersion { major: 2, minor: 9 })
    ));

    bytes[0..4].copy_from_slice(b"GRSX");
    assert!(matches!(Document::decode(&bytes), Err(Error::InvalidMagic)));
    assert!(matches!(Document::decode(b"GR"), Err(Error::UnexpectedEof { .. })));
}

#[test]
fn test_negative_count_rejected() {
    let mut doc = Document::new(Version::V2_3);
    doc.volume_boxes.clear();
    let mut bytes = doc.encode().expect("encode");
    // Mesh count sits just before the empty volume list.
    let n = bytes.len();
    bytes[n - 8..n - 4].copy_from_slice(&(-1i32).to_le_bytes());
    let err = Document::decode(&bytes).expect_err("negative count");
    assert!(err.is_format_error());
}

#[test]
fn test_texture_dedup_on_decode() {
    let mut doc = Document::new(Version::V2_2);
    doc.textures = vec!["a.bmp".into(), "b.bmp".into(), "a.bmp".into()];
    let mut mesh = MeshNode::new("m");
    mesh.texture_indexes = vec![0, 1, 2];
    mesh.vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
    mesh.texture_vertices = vec![TextureVertex::new(0.0, 0.0)];
    mesh.faces = vec![
        Face::new([0, 1, 2], [0, 0, 0], 0),
        Face::new([0, 1, 2], [0, 0, 0], 1),
        Face::new([0, 1, 2], [0, 0, 0], 2),
    ];
    doc.meshes.push(mesh);

    let back = Document::decode(&doc.encode().expect("encode")).expect("decode");
    let m = &back.meshes[0];
    let slot = |f: &Face| m.absolute_texture_id(f.texture_id as usize);
    assert_eq!(slot(&m.faces[2]), slot(&m.faces[0]));
    assert_eq!(slot(&m.faces[0]), Some(0));
    assert_eq!(slot(&m.faces[1]), Some(1));
    assert_eq!(back.texture_name(0, m.faces[2].texture_id as usize), Some("a.bmp"));
}

#[test]
fn test_unresolved_parent_is_a_warning() {
    let mut doc = Document::new(Version::V2_3);
    doc.meshes.push(MeshNode::new("a").with_parent("ghost"));
    let back = Document::decode(&doc.encode().expect("encode")).expect("decode");
    assert_eq!(back.roots(), vec![0]);
    assert_eq!(
        back.warnings(),
        &[LoadWarning::UnresolvedParent { mesh: "a".into(), parent: "ghost".into() }]
    );
}

#[test]
fn test_cyclic_file_rejected() {
    let mut doc = Document::new(Version::V2_3);
    doc.meshes.push(MeshNode::new("a").with_parent("b"));
    doc.meshes.push(MeshNode::new("b").with_parent("a"));
    let bytes = doc.encode().expect("encode");
    assert!(matches!(Document::decode(&bytes), Err(Error::CyclicHierarchy { .. })));
}

#[test]
fn test_save_and_open() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let doc = sample(Version::V2_3);
    doc.save(temp.path()).expect("save");

    let back = Document::open(temp.path()).expect("open");
    assert_eq!(back.meshes.len(), 2);
    assert_eq!(back.encode().expect("encode"), doc.encode().expect("encode"));
}

#[test]
fn test_open_missing_and_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("none.rsm");
    assert!(matches!(Document::open(&missing), Err(Error::FileNotFound(_))));

    let empty = NamedTempFile::new().expect("Failed to create temp file");
    assert!(matches!(Document::open(empty.path()), Err(Error::UnexpectedEof { .. })));
}
