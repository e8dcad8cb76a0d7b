// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Platform process-control primitives consumed by the watcher threads: kill,
//! pause (stop), and resume (continue) a running child by pid.

#[cfg(unix)]
mod unix {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    pub fn kill_process(pid: i32) -> std::io::Result<()> {
        kill(Pid::from_raw(pid), Signal::SIGKILL).map_err(std::io::Error::from)
    }

    pub fn pause_process(pid: i32) -> std::io::Result<()> {
        kill(Pid::from_raw(pid), Signal::SIGSTOP).map_err(std::io::Error::from)
    }

    pub fn resume_process(pid: i32) -> std::io::Result<()> {
        kill(Pid::from_raw(pid), Signal::SIGCONT).map_err(std::io::Error::from)
    }
}

#[cfg(windows)]
mod windows {
    use windows_sys::Win32::Foundation::{CloseHandle, HANDLE, INVALID_HANDLE_VALUE};
    use windows_sys::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, Thread32First, Thread32Next, TH32CS_SNAPTHREAD, THREADENTRY32,
    };
    use windows_sys::Win32::System::Threading::{
        OpenProcess, OpenThread, ResumeThread, SuspendThread, TerminateProcess,
        PROCESS_TERMINATE, THREAD_SUSPEND_RESUME,
    };

    pub fn kill_process(pid: i32) -> std::io::Result<()> {
        unsafe {
            let handle: HANDLE = OpenProcess(PROCESS_TERMINATE, 0, pid as u32);
            if handle == 0 {
                return Err(std::io::Error::last_os_error());
            }
            let ok = TerminateProcess(handle, 1);
            CloseHandle(handle);
            if ok == 0 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        }
    }

    /// Windows has no direct "stop this process" call; the common technique is to
    /// suspend every thread in the process via a toolhelp snapshot.
    fn for_each_thread(pid: i32, mut f: impl FnMut(HANDLE)) -> std::io::Result<()> {
        unsafe {
            let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPTHREAD, 0);
            if snapshot == INVALID_HANDLE_VALUE {
                return Err(std::io::Error::last_os_error());
            }

            let mut entry: THREADENTRY32 = std::mem::zeroed();
            entry.dwSize = std::mem::size_of::<THREADENTRY32>() as u32;

            if Thread32First(snapshot, &mut entry) != 0 {
                loop {
                    if entry.th32OwnerProcessID == pid as u32 {
                        let thread = OpenThread(THREAD_SUSPEND_RESUME, 0, entry.th32ThreadID);
                        if thread != 0 {
                            f(thread);
                            CloseHandle(thread);
                        }
                    }
                    if Thread32Next(snapshot, &mut entry) == 0 {
                        break;
                    }
                }
            }
            CloseHandle(snapshot);
        }
        Ok(())
    }

    pub fn pause_process(pid: i32) -> std::io::Result<()> {
        for_each_thread(pid, |thread| unsafe {
            SuspendThread(thread);
        })
    }

    pub fn resume_process(pid: i32) -> std::io::Result<()> {
        for_each_thread(pid, |thread| unsafe {
            ResumeThread(thread);
        })
    }
}

#[cfg(unix)]
pub use unix::{kill_process, pause_process, resume_process};

#[cfg(windows)]
pub use windows::{kill_process, pause_process, resume_process};

#[cfg(not(any(unix, windows)))]
mod fallback {
    pub fn kill_process(_pid: i32) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "process control unsupported on this platform",
        ))
    }

    pub fn pause_process(_pid: i32) -> std::io::Result<()> {
        kill_process(_pid)
    }

    pub fn resume_process(_pid: i32) -> std::io::Result<()> {
        kill_process(_pid)
    }
}

#[cfg(not(any(unix, windows)))]
pub use fallback::{kill_process, pause_process, resume_process};
