use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fs::sysfs::helpers;
use fs::SysfsAttr;
use test_support::mock::vfs::{MOCK_CLOCK, MockClock};
use vfs::{FileMode, FileSystem, FsError, NodeType, OpenFlags, TimeSpec, Vfs, VfsOps};

const FILE: FileMode = FileMode::DEFAULT_FILE;
const DIR: FileMode = FileMode::DEFAULT_DIR;

struct Clock(Arc<MockClock>);

impl VfsOps for Clock {
    fn timespec_now(&self) -> TimeSpec {
        self.0.now()
    }
}

struct StaticClock;

impl VfsOps for StaticClock {
    fn timespec_now(&self) -> TimeSpec {
        MOCK_CLOCK.now()
    }
}

fn sysfs_at_root(vfs: &Vfs) {
    helpers::register(vfs).unwrap();
    helpers::mount(vfs, "/").unwrap();
}

fn sysfs_root() -> Vfs {
    let vfs = Vfs::new();
    sysfs_at_root(&vfs);
    vfs
}

#[test]
fn test_get_and_set_data() {
    let vfs = sysfs_root();
    helpers::mkdir(&vfs, "/kernel", DIR).unwrap();
    helpers::create_file(&vfs, "/kernel/version", FILE, b"1.0").unwrap();
    assert_eq!(helpers::get_data(&vfs, "/kernel/version").unwrap(), b"1.0");

    helpers::set_data(&vfs, "/kernel/version", b"2.0-rc1").unwrap();
    assert_eq!(helpers::get_data(&vfs, "/kernel/version").unwrap(), b"2.0-rc1");
    assert_eq!(vfs.stat("/kernel/version").unwrap().st_size, 7);

    // set_data 不创建文件
    assert_eq!(
        helpers::set_data(&vfs, "/kernel/none", b"x"),
        Err(FsError::NotFound)
    );
    assert_eq!(
        helpers::get_data(&vfs, "/kernel"),
        Err(FsError::IsDirectory)
    );
}

#[test]
fn test_symlink_data() {
    let vfs = sysfs_root();
    helpers::create_symlink(&vfs, "/link", "/kernel/version").unwrap();
    assert_eq!(helpers::get_data(&vfs, "/link").unwrap(), b"/kernel/version");
}

#[test]
fn test_remove() {
    let vfs = sysfs_root();
    helpers::mkdir(&vfs, "/d", DIR).unwrap();
    helpers::create_file(&vfs, "/d/f", FILE, b"x").unwrap();
    helpers::create_symlink(&vfs, "/d/l", "f").unwrap();

    assert_eq!(helpers::remove(&vfs, "/d"), Err(FsError::DirectoryNotEmpty));
    helpers::remove(&vfs, "/d/l").unwrap();
    helpers::remove(&vfs, "/d/f").unwrap();
    helpers::remove(&vfs, "/d").unwrap();
    assert_eq!(helpers::remove(&vfs, "/d"), Err(FsError::NotFound));
}

#[test]
fn test_remove_tree() {
    let vfs = sysfs_root();
    helpers::mkdir(&vfs, "/a", DIR).unwrap();
    helpers::mkdir(&vfs, "/a/b", DIR).unwrap();
    helpers::create_file(&vfs, "/a/b/c", FILE, b"x").unwrap();
    helpers::create_symlink(&vfs, "/a/l", "b").unwrap();
    let before = vfs.node_count();

    helpers::remove_tree(&vfs, "/a").unwrap();
    assert_eq!(vfs.node_count(), before - 4);
    assert_eq!(vfs.lookup("/a"), Err(FsError::NotFound));
}

#[test]
fn test_attribute_show() {
    let vfs = sysfs_root();
    helpers::mkdir(&vfs, "/dev0", DIR).unwrap();

    let reads = Arc::new(AtomicUsize::new(0));
    let counter = reads.clone();
    let attr = SysfsAttr {
        name: "count".to_string(),
        mode: FileMode::from_perm(0o444),
        show: Arc::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("{}\n", n))
        }),
        store: None,
    };
    helpers::create_attr(&vfs, "/dev0", attr).unwrap();

    // 每次读取都重新生成内容
    assert_eq!(helpers::get_data(&vfs, "/dev0/count").unwrap(), b"1\n");
    assert!(reads.load(Ordering::SeqCst) >= 1);
    let again = helpers::get_data(&vfs, "/dev0/count").unwrap();
    assert_ne!(again, b"1\n");

    // 只读属性拒绝写入
    assert_eq!(
        helpers::set_data(&vfs, "/dev0/count", b"5"),
        Err(FsError::PermissionDenied)
    );
    assert_eq!(vfs.stat("/dev0/count").unwrap().permissions(), 0o444);
}

#[test]
fn test_attribute_store() {
    let vfs = sysfs_root();
    helpers::mkdir(&vfs, "/led", DIR).unwrap();

    let state = Arc::new(Mutex::new(String::from("0")));
    let shown = state.clone();
    let stored = state.clone();
    let attr = SysfsAttr {
        name: "brightness".to_string(),
        mode: FileMode::from_perm(0o644),
        show: Arc::new(move || Ok(format!("{}\n", shown.lock().unwrap()))),
        store: Some(Arc::new(move |buf: &[u8]| -> Result<(), FsError> {
            let text = core::str::from_utf8(buf).map_err(|_| FsError::InvalidArgument)?;
            *stored.lock().unwrap() = text.trim().to_string();
            Ok(())
        })),
    };
    helpers::create_attr(&vfs, "/led", attr).unwrap();

    helpers::set_data(&vfs, "/led/brightness", b"128\n").unwrap();
    assert_eq!(*state.lock().unwrap(), "128");
    assert_eq!(vfs.read_file("/led/brightness").unwrap(), b"128\n");

    assert_eq!(
        helpers::set_data(&vfs, "/led/brightness", &[0xff, 0xfe]),
        Err(FsError::InvalidArgument)
    );
    assert_eq!(*state.lock().unwrap(), "128");
}

#[test]
fn test_attribute_duplicate_name() {
    let vfs = sysfs_root();
    helpers::mkdir(&vfs, "/d", DIR).unwrap();
    helpers::create_attr(&vfs, "/d", SysfsAttr::read_only("a", "1".to_string())).unwrap();
    assert_eq!(
        helpers::create_attr(&vfs, "/d", SysfsAttr::read_only("a", "2".to_string())),
        Err(FsError::AlreadyExists)
    );
    assert_eq!(helpers::get_data(&vfs, "/d/a").unwrap(), b"1");
}

#[test]
fn test_helpers_refuse_foreign_backend() {
    struct Plain;
    impl FileSystem for Plain {
        fn fs_type(&self) -> &'static str {
            "plain"
        }
    }

    let vfs = sysfs_root();
    vfs.register_backend(Arc::new(Plain)).unwrap();
    helpers::mkdir(&vfs, "/mnt", DIR).unwrap();
    vfs.mount("/mnt", "plain").unwrap();

    assert_eq!(
        helpers::create_file(&vfs, "/mnt/f", FILE, b"x"),
        Err(FsError::NotSupported)
    );
    assert_eq!(
        helpers::create_attr(&vfs, "/mnt", SysfsAttr::read_only("a", String::new())),
        Err(FsError::NotSupported)
    );
    assert!(vfs.read_dir("/mnt").unwrap().is_empty());
}

#[test]
fn test_mount_requires_registration() {
    let vfs = Vfs::new();
    assert_eq!(helpers::mount(&vfs, "/"), Err(FsError::NotFound));
    sysfs_at_root(&vfs);
    assert_eq!(helpers::umount(&vfs, "/nope"), Err(FsError::NotFound));
    helpers::umount(&vfs, "/").unwrap();
}

#[test]
fn test_timestamps_from_clock() {
    let clock = Arc::new(MockClock::new(50));
    let vfs = Vfs::with_ops(Arc::new(Clock(clock.clone())));
    sysfs_at_root(&vfs);

    helpers::create_file(&vfs, "/f", FILE, b"a").unwrap();
    let st = vfs.stat("/f").unwrap();
    assert_eq!(st.st_ctime, TimeSpec::new(50, 0));
    assert_eq!(st.st_mtime, TimeSpec::new(50, 0));

    clock.advance(10);
    let mut h = vfs.open("/f", OpenFlags::O_WRONLY, FileMode::empty()).unwrap();
    vfs.write(&mut h, b"b").unwrap();
    vfs.close(h).unwrap();
    let st = vfs.stat("/f").unwrap();
    assert_eq!(st.st_mtime, TimeSpec::new(60, 0));
    assert_eq!(st.st_ctime, TimeSpec::new(50, 0));

    clock.advance(5);
    vfs.read_file("/f").unwrap();
    assert_eq!(vfs.stat("/f").unwrap().st_atime, TimeSpec::new(65, 0));
}

#[test]
fn test_clock_injected_after_creation() {
    let vfs = sysfs_root();
    helpers::create_file(&vfs, "/before", FILE, b"").unwrap();
    vfs.set_ops(Arc::new(StaticClock));
    helpers::create_file(&vfs, "/after", FILE, b"").unwrap();

    assert_eq!(vfs.stat("/before").unwrap().st_ctime, TimeSpec::zero());
    assert_eq!(vfs.stat("/after").unwrap().st_ctime, MOCK_CLOCK.now());

    let node = vfs.lookup("/after").unwrap();
    assert_eq!(vfs.metadata(node).unwrap().node_type, NodeType::File);
}
