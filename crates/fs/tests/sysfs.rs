use std::sync::Arc;

use fs::sysfs::{self, helpers};
use vfs::{FileMode, FsError, NodeType, OpenFlags, SeekWhence, SetAttr, Vfs};

const FILE: FileMode = FileMode::DEFAULT_FILE;
const DIR: FileMode = FileMode::DEFAULT_DIR;

fn sysfs_root() -> Vfs {
    let vfs = Vfs::new();
    helpers::register(&vfs).unwrap();
    helpers::mount(&vfs, "/").unwrap();
    vfs
}

fn names(vfs: &Vfs, path: &str) -> Vec<String> {
    vfs.read_dir(path)
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect()
}

#[test]
fn test_scenario_a_create_and_list() {
    let vfs = sysfs_root();
    vfs.mkdir("/test", FileMode::from_perm(0o755)).unwrap();
    helpers::create_file(&vfs, "/test/hello.txt", FileMode::from_perm(0o644), b"hi").unwrap();

    let node = vfs.lookup("/test/hello.txt").unwrap();
    let meta = vfs.metadata(node).unwrap();
    assert_eq!(meta.node_type, NodeType::File);
    assert_eq!(meta.size, 2);

    let entries = vfs.read_dir("/test").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "hello.txt");
    assert_eq!(entries[0].ino, node.ino());
    assert_eq!(entries[0].node_type, NodeType::File);
}

#[test]
fn test_scenario_b_rename() {
    let vfs = sysfs_root();
    vfs.create("/a.txt", FILE).unwrap();
    vfs.rename("/a.txt", "/b.txt").unwrap();
    assert_eq!(vfs.lookup("/a.txt"), Err(FsError::NotFound));
    assert!(vfs.lookup("/b.txt").is_ok());
}

#[test]
fn test_scenario_c_duplicate_mkdir() {
    let vfs = sysfs_root();
    vfs.mkdir("/d", DIR).unwrap();
    assert_eq!(vfs.mkdir("/d", DIR), Err(FsError::AlreadyExists));
}

#[test]
fn test_scenario_d_open_create_round_trip() {
    let vfs = sysfs_root();
    assert_eq!(
        vfs.open("/missing.txt", OpenFlags::O_RDONLY, FileMode::empty())
            .err(),
        Some(FsError::NotFound)
    );

    let mut h = vfs
        .open("/missing.txt", OpenFlags::O_RDWR | OpenFlags::O_CREAT, FILE)
        .unwrap();
    assert_eq!(vfs.write(&mut h, b"payload"), Ok(7));
    vfs.lseek(&mut h, 0, SeekWhence::Set).unwrap();
    let mut buf = [0u8; 16];
    assert_eq!(vfs.read(&mut h, &mut buf), Ok(7));
    assert_eq!(&buf[..7], b"payload");
    vfs.close(h).unwrap();
}

#[test]
fn test_scenario_e_rmdir_gate() {
    let vfs = sysfs_root();
    vfs.mkdir("/d", DIR).unwrap();
    vfs.create("/d/f", FILE).unwrap();
    assert_eq!(vfs.rmdir("/d"), Err(FsError::DirectoryNotEmpty));
    assert!(vfs.lookup("/d/f").is_ok());
    vfs.unlink("/d/f").unwrap();
    vfs.rmdir("/d").unwrap();
    assert_eq!(vfs.lookup("/d"), Err(FsError::NotFound));
}

#[test]
fn test_sibling_names_stay_unique() {
    let vfs = sysfs_root();
    vfs.mkdir("/d", DIR).unwrap();
    vfs.create("/d/x", FILE).unwrap();
    vfs.create("/d/y", FILE).unwrap();

    assert_eq!(vfs.create("/d/x", FILE), Err(FsError::AlreadyExists));
    assert_eq!(vfs.mkdir("/d/x", DIR), Err(FsError::AlreadyExists));
    assert_eq!(vfs.symlink("/d/x", "/y"), Err(FsError::AlreadyExists));
    assert_eq!(vfs.rename("/d/y", "/d/x"), Err(FsError::AlreadyExists));
    assert_eq!(
        helpers::create_file(&vfs, "/d/y", FILE, b"dup"),
        Err(FsError::AlreadyExists)
    );

    assert_eq!(names(&vfs, "/d"), vec!["x", "y"]);
}

#[test]
fn test_write_read_round_trip_large() {
    let vfs = sysfs_root();
    let data: Vec<u8> = (0..1500u32).map(|i| (i % 251) as u8).collect();

    let mut h = vfs
        .open("/blob", OpenFlags::O_WRONLY | OpenFlags::O_CREAT, FILE)
        .unwrap();
    for chunk in data.chunks(100) {
        assert_eq!(vfs.write(&mut h, chunk), Ok(chunk.len()));
    }
    vfs.close(h).unwrap();

    assert_eq!(vfs.stat("/blob").unwrap().st_size, 1500);
    assert_eq!(vfs.read_file("/blob").unwrap(), data);
}

#[test]
fn test_overwrite_in_place_keeps_size() {
    let vfs = sysfs_root();
    helpers::create_file(&vfs, "/f", FILE, b"abcdef").unwrap();
    let mut h = vfs.open("/f", OpenFlags::O_RDWR, FileMode::empty()).unwrap();
    vfs.lseek(&mut h, 2, SeekWhence::Set).unwrap();
    vfs.write(&mut h, b"XY").unwrap();
    vfs.close(h).unwrap();

    assert_eq!(vfs.read_file("/f").unwrap(), b"abXYef");
    assert_eq!(vfs.stat("/f").unwrap().st_size, 6);
}

#[test]
fn test_failed_rename_keeps_node_in_place() {
    let vfs = sysfs_root();
    vfs.mkdir("/d", DIR).unwrap();
    helpers::create_file(&vfs, "/d/f", FILE, b"keep").unwrap();
    vfs.create("/taken", FILE).unwrap();

    assert_eq!(vfs.rename("/d/f", "/taken"), Err(FsError::AlreadyExists));
    assert_eq!(vfs.rename("/d/f", "/nowhere/f"), Err(FsError::NotFound));
    assert_eq!(vfs.rename("/d/f", "/taken/f"), Err(FsError::NotDirectory));
    assert_eq!(vfs.rename("/d/f", "/d/a/b"), Err(FsError::NotFound));

    assert_eq!(helpers::get_data(&vfs, "/d/f").unwrap(), b"keep");
    assert_eq!(names(&vfs, "/d"), vec!["f"]);
    assert_eq!(names(&vfs, "/"), vec!["d", "taken"]);

    // 同名重命名是空操作
    vfs.rename("/d/f", "/d/f").unwrap();
    assert_eq!(names(&vfs, "/d"), vec!["f"]);
}

#[test]
fn test_negative_seek_leaves_cursor() {
    let vfs = sysfs_root();
    helpers::create_file(&vfs, "/f", FILE, b"0123456789").unwrap();
    let mut h = vfs.open("/f", OpenFlags::O_RDONLY, FileMode::empty()).unwrap();
    vfs.lseek(&mut h, 4, SeekWhence::Set).unwrap();

    for (offset, whence) in [
        (-1, SeekWhence::Set),
        (-5, SeekWhence::Cur),
        (-11, SeekWhence::End),
    ] {
        assert_eq!(
            vfs.lseek(&mut h, offset, whence),
            Err(FsError::InvalidArgument)
        );
        assert_eq!(h.pos(), 4);
    }
    assert_eq!(vfs.lseek(&mut h, -10, SeekWhence::End), Ok(0));
    vfs.close(h).unwrap();
}

#[test]
fn test_read_past_end_returns_zero() {
    let vfs = sysfs_root();
    helpers::create_file(&vfs, "/f", FILE, b"abc").unwrap();
    vfs.create("/empty", FILE).unwrap();

    let mut h = vfs.open("/f", OpenFlags::O_RDONLY, FileMode::empty()).unwrap();
    vfs.lseek(&mut h, 10, SeekWhence::Set).unwrap();
    let mut buf = [0u8; 4];
    assert_eq!(vfs.read(&mut h, &mut buf), Ok(0));
    vfs.close(h).unwrap();

    let mut h = vfs.open("/empty", OpenFlags::O_RDONLY, FileMode::empty()).unwrap();
    assert_eq!(vfs.read(&mut h, &mut buf), Ok(0));
    vfs.close(h).unwrap();
}

#[test]
fn test_getattr_synthesizes_type_bits() {
    let vfs = sysfs_root();
    vfs.mkdir("/d", FileMode::from_perm(0o750)).unwrap();
    helpers::create_file(&vfs, "/d/f", FileMode::from_perm(0o640), b"12345").unwrap();
    vfs.symlink("/d/l", "/d/f").unwrap();

    let d = vfs.stat("/d").unwrap();
    assert!(d.is_dir());
    assert_eq!(d.permissions(), 0o750);

    let f = vfs.stat("/d/f").unwrap();
    assert!(f.is_file());
    assert_eq!(f.permissions(), 0o640);
    assert_eq!(f.st_size, 5);

    let l = vfs.stat("/d/l").unwrap();
    assert!(l.is_symlink());
    assert_eq!(l.st_size, 4);
}

#[test]
fn test_setattr_mode_and_size() {
    let vfs = sysfs_root();
    helpers::create_file(&vfs, "/f", FILE, b"abcdef").unwrap();

    vfs.chmod("/f", FileMode::from_perm(0o600)).unwrap();
    assert_eq!(vfs.stat("/f").unwrap().permissions(), 0o600);

    vfs.setattr("/f", &SetAttr::new().with_size(3)).unwrap();
    assert_eq!(vfs.read_file("/f").unwrap(), b"abc");

    vfs.setattr("/f", &SetAttr::new().with_size(5)).unwrap();
    assert_eq!(vfs.read_file("/f").unwrap(), b"abc\0\0");
}

#[test]
fn test_setattr_size_only_on_files() {
    let vfs = sysfs_root();
    vfs.mkdir("/d", DIR).unwrap();
    helpers::create_symlink(&vfs, "/l", "/d").unwrap();
    let dir_size = vfs.stat("/d").unwrap().st_size;

    assert_eq!(
        vfs.setattr("/d", &SetAttr::new().with_size(10)),
        Err(FsError::IsDirectory)
    );
    assert_eq!(vfs.stat("/d").unwrap().st_size, dir_size);
    assert_eq!(helpers::get_data(&vfs, "/d"), Err(FsError::IsDirectory));

    assert_eq!(
        vfs.setattr("/l", &SetAttr::new().with_size(0)),
        Err(FsError::InvalidArgument)
    );
    assert_eq!(vfs.readlink("/l").unwrap(), "/d");
}

#[test]
fn test_open_truncate() {
    let vfs = sysfs_root();
    helpers::create_file(&vfs, "/f", FILE, b"old contents").unwrap();
    assert_eq!(vfs.write_file("/f", b"new"), Ok(3));
    assert_eq!(vfs.read_file("/f").unwrap(), b"new");
    assert_eq!(vfs.stat("/f").unwrap().st_size, 3);
}

#[test]
fn test_symlinks() {
    let vfs = sysfs_root();
    vfs.mkdir("/d", DIR).unwrap();
    vfs.symlink("/d/link", "../target").unwrap();

    assert_eq!(vfs.readlink("/d/link").unwrap(), "../target");
    assert_eq!(vfs.readlink("/d"), Err(FsError::InvalidArgument));
    assert_eq!(
        vfs.open("/d/link", OpenFlags::O_RDONLY, FileMode::empty())
            .err(),
        Some(FsError::InvalidArgument)
    );
    assert_eq!(vfs.symlink("/d/empty", ""), Err(FsError::InvalidArgument));

    // 解析不跟随链接
    assert_eq!(vfs.lookup("/d/link/x"), Err(FsError::NotFound));
    vfs.unlink("/d/link").unwrap();
    assert!(names(&vfs, "/d").is_empty());
}

#[test]
fn test_unlink_directory_rejected() {
    let vfs = sysfs_root();
    vfs.mkdir("/d", DIR).unwrap();
    assert_eq!(vfs.unlink("/d"), Err(FsError::IsDirectory));
    assert!(vfs.lookup("/d").is_ok());
}

#[test]
fn test_ioctl_not_supported() {
    let vfs = sysfs_root();
    vfs.create("/f", FILE).unwrap();
    let h = vfs.open("/f", OpenFlags::O_RDONLY, FileMode::empty()).unwrap();
    assert_eq!(vfs.ioctl(&h, 0x5401, 0), Err(FsError::NotSupported));
    vfs.close(h).unwrap();
}

#[test]
fn test_mounted_under_subdirectory() {
    let vfs = sysfs_root();
    vfs.mkdir("/sys", DIR).unwrap();
    helpers::create_file(&vfs, "/sys/hidden", FILE, b"").unwrap();
    helpers::mount(&vfs, "/sys").unwrap();

    // 新实例从空目录开始，与根上的实例互不影响
    assert!(names(&vfs, "/sys").is_empty());
    helpers::create_file(&vfs, "/sys/kernel", FILE, b"k").unwrap();
    assert_ne!(
        vfs.stat("/sys/kernel").unwrap().st_dev,
        vfs.stat("/").unwrap().st_dev
    );

    assert_eq!(helpers::umount(&vfs, "/"), Err(FsError::DirectoryNotEmpty));
    helpers::umount(&vfs, "/sys").unwrap();
    assert_eq!(names(&vfs, "/sys"), vec!["hidden"]);
}

#[test]
fn test_double_register() {
    let vfs = sysfs_root();
    assert_eq!(helpers::register(&vfs), Err(FsError::AlreadyExists));
    assert_eq!(vfs.backends(), vec![sysfs::SYSFS_NAME]);
    assert_eq!(vfs.register_backend(Arc::new(sysfs::SysFs)), Err(FsError::AlreadyExists));
}
