// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Windows resource enforcement via Job Objects, and sampling via the process/psapi APIs.
//!
//! CPU limits are informational only here: Job Object CPU rate control exists
//! (`JOBOBJECT_CPU_RATE_CONTROL_INFORMATION`) but is left to the resource watcher's
//! soft enforcement, per the memory-only hard-limit scope this runner targets.

use std::mem::size_of;

use windows_sys::Win32::Foundation::{CloseHandle, FILETIME, HANDLE};
use windows_sys::Win32::System::JobObjects::{
    AssignProcessToJobObject, CreateJobObjectW, JobObjectExtendedLimitInformation,
    SetInformationJobObject, JOBOBJECTINFOCLASS, JOBOBJECT_EXTENDED_LIMIT_INFORMATION,
    JOB_OBJECT_LIMIT_JOB_MEMORY,
};
use windows_sys::Win32::System::ProcessStatus::{GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS};
use windows_sys::Win32::System::Threading::{
    GetProcessTimes, OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
};

use crate::errors::ResourceLimitError;

use super::Usage;

/// A Job Object handle; all assigned processes are terminated when this is dropped,
/// same as the kernel does when the last handle to a job closes.
pub struct JobHandle {
    handle: HANDLE,
}

unsafe impl Send for JobHandle {}
unsafe impl Sync for JobHandle {}

impl JobHandle {
    pub fn create(memory_limit_bytes: Option<u64>) -> Result<Self, ResourceLimitError> {
        let handle = unsafe { CreateJobObjectW(std::ptr::null(), std::ptr::null()) };
        if handle == 0 {
            return Err(ResourceLimitError::JobObjectCreateFailed(
                "CreateJobObjectW returned a null handle".to_string(),
            ));
        }

        if let Some(limit) = memory_limit_bytes {
            let mut info: JOBOBJECT_EXTENDED_LIMIT_INFORMATION = unsafe { std::mem::zeroed() };
            info.BasicLimitInformation.LimitFlags = JOB_OBJECT_LIMIT_JOB_MEMORY;
            info.JobMemoryLimit = limit as usize;

            let ok = unsafe {
                SetInformationJobObject(
                    handle,
                    JobObjectExtendedLimitInformation as JOBOBJECTINFOCLASS,
                    &info as *const _ as *const core::ffi::c_void,
                    size_of::<JOBOBJECT_EXTENDED_LIMIT_INFORMATION>() as u32,
                )
            };
            if ok == 0 {
                unsafe { CloseHandle(handle) };
                return Err(ResourceLimitError::JobObjectCreateFailed(
                    "SetInformationJobObject failed while setting memory limit".to_string(),
                ));
            }
        }

        Ok(JobHandle { handle })
    }

    pub fn apply(&self, pid: i32) -> Result<(), ResourceLimitError> {
        let process = unsafe { OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, 0, pid as u32) };
        if process == 0 {
            return Err(ResourceLimitError::JobObjectAssignFailed(format!(
                "OpenProcess failed for pid {}",
                pid
            )));
        }

        let ok = unsafe { AssignProcessToJobObject(self.handle, process) };
        unsafe { CloseHandle(process) };

        if ok == 0 {
            return Err(ResourceLimitError::JobObjectAssignFailed(format!(
                "AssignProcessToJobObject failed for pid {}",
                pid
            )));
        }

        Ok(())
    }

    pub fn release(&self) {
        unsafe {
            CloseHandle(self.handle);
        }
    }
}

fn filetime_to_ns(ft: &FILETIME) -> u64 {
    let ticks = ((ft.dwHighDateTime as u64) << 32) | ft.dwLowDateTime as u64;
    // FILETIME ticks are 100ns units.
    ticks * 100
}

pub fn sample_usage(pid: i32) -> Result<Usage, ResourceLimitError> {
    let process = unsafe { OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, 0, pid as u32) };
    if process == 0 {
        return Err(ResourceLimitError::SamplingFailed {
            pid,
            source: std::io::Error::last_os_error(),
        });
    }

    let mut counters: PROCESS_MEMORY_COUNTERS = unsafe { std::mem::zeroed() };
    let mem_ok = unsafe {
        GetProcessMemoryInfo(process, &mut counters, size_of::<PROCESS_MEMORY_COUNTERS>() as u32)
    };

    let mut creation = FILETIME::default();
    let mut exit = FILETIME::default();
    let mut kernel = FILETIME::default();
    let mut user = FILETIME::default();
    let time_ok = unsafe { GetProcessTimes(process, &mut creation, &mut exit, &mut kernel, &mut user) };

    unsafe { CloseHandle(process) };

    if mem_ok == 0 || time_ok == 0 {
        return Err(ResourceLimitError::SamplingFailed {
            pid,
            source: std::io::Error::last_os_error(),
        });
    }

    Ok(Usage {
        rss_bytes: counters.WorkingSetSize as u64,
        cpu_time_ns: filetime_to_ns(&kernel) + filetime_to_ns(&user),
        cpu_percent: 0.0,
    })
}
